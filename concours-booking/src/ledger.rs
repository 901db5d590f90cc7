use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use concours_catalog::vehicle::VehicleStatus;

use crate::models::{Booking, BookingStatus, CreateBookingRequest};

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Vehicle not found: {0}")]
    VehicleNotFound(Uuid),

    #[error("Vehicle {vehicle_id} is not available for test drives ({status})")]
    VehicleUnavailable {
        vehicle_id: Uuid,
        status: VehicleStatus,
    },

    #[error("Booking not found: {0}")]
    BookingNotFound(Uuid),

    #[error("Booking {0} has already been paid")]
    AlreadyPaid(Uuid),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: &'static str },

    #[error("Payment processor error: {0}")]
    PaymentFailed(String),

    #[error("Payment {reference} was captured but booking {booking_id} could not be updated: {source_message}")]
    ConfirmationNotRecorded {
        booking_id: Uuid,
        reference: String,
        source_message: String,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Repository trait for booking persistence.
///
/// `mark_paid` and `transition_status` are conditional writes: they return
/// `true` only when the row was actually flipped, which makes the store the
/// final arbiter between concurrent callers.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(
        &self,
        booking: &Booking,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn fetch(
        &self,
        id: Uuid,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>>;

    /// Set `payment_status = PAID`, `status = CONFIRMED` and store the
    /// processor reference, only while neither has fired before.
    async fn mark_paid(
        &self,
        id: Uuid,
        reference: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Move `status` from `from` to `to`, only while the row still holds `from`.
    async fn transition_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

/// Single source of truth for booking state.
///
/// All transitions of `status`/`payment_status` go through this type; no
/// other component mutates a booking row directly.
pub struct BookingLedger {
    repo: Arc<dyn BookingRepository>,
}

impl BookingLedger {
    pub fn new(repo: Arc<dyn BookingRepository>) -> Self {
        Self { repo }
    }

    /// Persist a new booking in `pending/pending` state.
    ///
    /// `canonical_fee_ngn` is the server-read fee; whatever amount the client
    /// may have supplied alongside the request never reaches this call. On
    /// validation failure nothing is persisted.
    pub async fn create(
        &self,
        request: &CreateBookingRequest,
        canonical_fee_ngn: i64,
    ) -> Result<Booking, BookingError> {
        let details = request.validate()?;
        let booking = Booking::new(details, canonical_fee_ngn);

        self.repo
            .insert(&booking)
            .await
            .map_err(|e| BookingError::Storage(e.to_string()))?;

        info!(
            booking_id = %booking.id,
            vehicle_id = %booking.vehicle_id,
            amount_ngn = booking.amount_ngn,
            "Booking created"
        );
        Ok(booking)
    }

    pub async fn get(&self, id: Uuid) -> Result<Booking, BookingError> {
        self.repo
            .fetch(id)
            .await
            .map_err(|e| BookingError::Storage(e.to_string()))?
            .ok_or(BookingError::BookingNotFound(id))
    }

    /// Transition: pending/pending -> confirmed/paid.
    ///
    /// The conditional write in the repository is the double-charge guard's
    /// final arbiter: of two concurrent calls at most one flips the row, and
    /// once the guard has fired every later call gets `AlreadyPaid`.
    pub async fn mark_paid(&self, id: Uuid, reference: &str) -> Result<Booking, BookingError> {
        let flipped = self
            .repo
            .mark_paid(id, reference)
            .await
            .map_err(|e| BookingError::Storage(e.to_string()))?;

        if !flipped {
            return match self.get(id).await {
                Ok(_) => Err(BookingError::AlreadyPaid(id)),
                Err(e) => Err(e),
            };
        }

        info!(booking_id = %id, reference, "Booking marked paid and confirmed");
        self.get(id).await
    }

    /// Administrative transition: pending -> cancelled. A paid booking is
    /// confirmed and therefore out of reach of this path.
    pub async fn cancel(&self, id: Uuid) -> Result<Booking, BookingError> {
        self.transition(id, BookingStatus::Pending, BookingStatus::Cancelled)
            .await
    }

    /// Administrative transition: confirmed -> completed, after the test
    /// drive has taken place.
    pub async fn complete(&self, id: Uuid) -> Result<Booking, BookingError> {
        self.transition(id, BookingStatus::Confirmed, BookingStatus::Completed)
            .await
    }

    async fn transition(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Booking, BookingError> {
        let moved = self
            .repo
            .transition_status(id, from, to)
            .await
            .map_err(|e| BookingError::Storage(e.to_string()))?;

        if !moved {
            let current = self.get(id).await?;
            return Err(BookingError::InvalidTransition {
                from: current.status.as_str().to_string(),
                to: to.as_str(),
            });
        }

        info!(booking_id = %id, from = from.as_str(), to = to.as_str(), "Booking status updated");
        self.get(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBookingRepository;
    use crate::models::PaymentState;

    fn request() -> CreateBookingRequest {
        CreateBookingRequest {
            vehicle_id: Uuid::new_v4(),
            customer_name: "Chinedu Eze".to_string(),
            customer_email: "chinedu@example.com".to_string(),
            customer_phone: "+2347011112222".to_string(),
            date: "2026-10-01".to_string(),
            time: "14:00".to_string(),
            location: "Lekki showroom".to_string(),
            notes: Some("Prefers weekend slots".to_string()),
        }
    }

    fn ledger() -> (BookingLedger, Arc<MemoryBookingRepository>) {
        let repo = Arc::new(MemoryBookingRepository::new());
        (BookingLedger::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn create_persists_pending_booking_with_canonical_fee() {
        let (ledger, _) = ledger();
        let booking = ledger.create(&request(), 159_984).await.unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.payment_status, PaymentState::Pending);
        assert_eq!(booking.amount_ngn, 159_984);

        let fetched = ledger.get(booking.id).await.unwrap();
        assert_eq!(fetched.amount_ngn, 159_984);
    }

    #[tokio::test]
    async fn invalid_request_persists_nothing() {
        let (ledger, repo) = ledger();
        let mut req = request();
        req.customer_phone = String::new();

        assert!(matches!(
            ledger.create(&req, 159_984).await,
            Err(BookingError::MissingField("customer_phone"))
        ));
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn mark_paid_fires_exactly_once() {
        let (ledger, _) = ledger();
        let booking = ledger.create(&request(), 159_984).await.unwrap();

        let paid = ledger.mark_paid(booking.id, "sb_pi_1").await.unwrap();
        assert_eq!(paid.status, BookingStatus::Confirmed);
        assert_eq!(paid.payment_status, PaymentState::Paid);
        assert_eq!(paid.payment_reference.as_deref(), Some("sb_pi_1"));

        let second = ledger.mark_paid(booking.id, "sb_pi_2").await;
        assert!(matches!(second, Err(BookingError::AlreadyPaid(id)) if id == booking.id));

        // The reference from the first call survives.
        let current = ledger.get(booking.id).await.unwrap();
        assert_eq!(current.payment_reference.as_deref(), Some("sb_pi_1"));
    }

    #[tokio::test]
    async fn mark_paid_on_unknown_booking_is_not_found() {
        let (ledger, _) = ledger();
        let missing = Uuid::new_v4();
        assert!(matches!(
            ledger.mark_paid(missing, "sb_pi_1").await,
            Err(BookingError::BookingNotFound(id)) if id == missing
        ));
    }

    #[tokio::test]
    async fn cancel_only_reaches_pending_bookings() {
        let (ledger, _) = ledger();
        let booking = ledger.create(&request(), 159_984).await.unwrap();

        let cancelled = ledger.cancel(booking.id).await.unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);

        let again = ledger.cancel(booking.id).await;
        assert!(matches!(again, Err(BookingError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn complete_requires_a_confirmed_booking() {
        let (ledger, _) = ledger();
        let booking = ledger.create(&request(), 159_984).await.unwrap();

        assert!(matches!(
            ledger.complete(booking.id).await,
            Err(BookingError::InvalidTransition { .. })
        ));

        ledger.mark_paid(booking.id, "sb_pi_1").await.unwrap();
        let completed = ledger.complete(booking.id).await.unwrap();
        assert_eq!(completed.status, BookingStatus::Completed);
        // Payment state is untouched by the administrative transition.
        assert_eq!(completed.payment_status, PaymentState::Paid);
    }
}
