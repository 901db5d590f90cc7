use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

use concours_catalog::availability::{AvailabilityService, CatalogError};
use concours_catalog::vehicle::VehicleStatus;
use concours_core::repository::SettingsRepository;

use crate::checkout::{CheckoutService, PaymentConfirmation};
use crate::ledger::{BookingError, BookingLedger};
use crate::models::{Booking, CreateBookingRequest};

/// Coordinates the two externally triggered booking transitions: Create
/// (validation, fee snapshot, ledger insert) and Pay (processor call, then
/// guarded ledger flip).
pub struct BookingOrchestrator {
    availability: Arc<AvailabilityService>,
    settings: Arc<dyn SettingsRepository>,
    ledger: Arc<BookingLedger>,
    checkout: Arc<CheckoutService>,
    default_fee_ngn: i64,
}

impl BookingOrchestrator {
    pub fn new(
        availability: Arc<AvailabilityService>,
        settings: Arc<dyn SettingsRepository>,
        ledger: Arc<BookingLedger>,
        checkout: Arc<CheckoutService>,
        default_fee_ngn: i64,
    ) -> Self {
        Self {
            availability,
            settings,
            ledger,
            checkout,
            default_fee_ngn,
        }
    }

    /// Transition 1: Create. Sole entry point into `pending`.
    ///
    /// The availability check and the insert are separate round-trips with no
    /// lock held between them; two concurrent requests for the same vehicle
    /// can both pass the check and both persist. That race is accepted and
    /// resolved at the business level by whichever booking the showroom
    /// honors.
    pub async fn create(&self, request: CreateBookingRequest) -> Result<Booking, BookingError> {
        let status = self
            .availability
            .vehicle_availability(request.vehicle_id)
            .await
            .map_err(|e| match e {
                CatalogError::NotFound(id) => BookingError::VehicleNotFound(id),
                CatalogError::Storage(msg) => BookingError::Storage(msg),
            })?;

        if status != VehicleStatus::Available {
            return Err(BookingError::VehicleUnavailable {
                vehicle_id: request.vehicle_id,
                status,
            });
        }

        let canonical_fee = self
            .settings
            .test_drive_fee()
            .await
            .map_err(|e| BookingError::Storage(e.to_string()))?
            .unwrap_or(self.default_fee_ngn);

        self.ledger.create(&request, canonical_fee).await
    }

    /// Transition 2: Pay. `client_amount` is accepted from the request body
    /// for API compatibility and explicitly ignored; the processor is always
    /// charged the ledger's canonical amount.
    pub async fn pay(
        &self,
        booking_id: Uuid,
        client_amount: Option<i64>,
    ) -> Result<PaymentConfirmation, BookingError> {
        if let Some(amount) = client_amount {
            warn!(
                booking_id = %booking_id,
                client_amount = amount,
                "Client-supplied amount ignored in favor of the canonical fee"
            );
        }

        let confirmation = self.checkout.authorize_and_confirm(booking_id).await?;

        match self.ledger.mark_paid(booking_id, &confirmation.reference).await {
            Ok(_) => Ok(confirmation),
            Err(BookingError::AlreadyPaid(id)) => {
                // A concurrent Pay won the guarded write; this call's charge
                // is the bounded duplicate authorization at the processor.
                warn!(
                    booking_id = %id,
                    reference = %confirmation.reference,
                    "Concurrent payment already recorded; duplicate authorization left at processor"
                );
                Err(BookingError::AlreadyPaid(id))
            }
            Err(e) => {
                error!(
                    booking_id = %booking_id,
                    reference = %confirmation.reference,
                    error = %e,
                    "Processor confirmed but the ledger update failed; manual reconciliation required"
                );
                Err(BookingError::ConfirmationNotRecorded {
                    booking_id,
                    reference: confirmation.reference,
                    source_message: e.to_string(),
                })
            }
        }
    }
}
