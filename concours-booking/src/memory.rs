use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use concours_core::repository::SettingsRepository;

use crate::ledger::BookingRepository;
use crate::models::{Booking, BookingStatus};

/// In-memory booking repository with the same conditional-write semantics as
/// the Postgres implementation. Used by tests and demo wiring.
pub struct MemoryBookingRepository {
    bookings: Mutex<HashMap<Uuid, Booking>>,
}

impl MemoryBookingRepository {
    pub fn new() -> Self {
        Self {
            bookings: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.lock().unwrap().is_empty()
    }
}

impl Default for MemoryBookingRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingRepository for MemoryBookingRepository {
    async fn insert(
        &self,
        booking: &Booking,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.bookings
            .lock()
            .unwrap()
            .insert(booking.id, booking.clone());
        Ok(())
    }

    async fn fetch(
        &self,
        id: Uuid,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.bookings.lock().unwrap().get(&id).cloned())
    }

    async fn mark_paid(
        &self,
        id: Uuid,
        reference: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut bookings = self.bookings.lock().unwrap();
        match bookings.get_mut(&id) {
            Some(booking) if booking.is_payable() => {
                booking.settle_payment(reference);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut bookings = self.bookings.lock().unwrap();
        match bookings.get_mut(&id) {
            Some(booking) if booking.status == from => {
                booking.status = to;
                booking.updated_at = chrono::Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Settings repository returning a fixed fee, for tests and demo wiring.
pub struct FixedSettings {
    fee_ngn: Option<i64>,
}

impl FixedSettings {
    pub fn new(fee_ngn: Option<i64>) -> Self {
        Self { fee_ngn }
    }
}

#[async_trait]
impl SettingsRepository for FixedSettings {
    async fn test_drive_fee(
        &self,
    ) -> Result<Option<i64>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.fee_ngn)
    }
}
