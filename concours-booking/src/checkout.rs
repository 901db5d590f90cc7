use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use concours_catalog::fee;
use concours_core::payment::{PaymentGateway, PaymentIntent, PaymentStatus};

use crate::ledger::{BookingError, BookingLedger};

/// Payment method the sandbox processor confirms against. The demo flow
/// never takes card details from the client.
pub const SANDBOX_PAYMENT_METHOD: &str = "pm_sandbox_visa";

#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub reference: String,
    pub status: PaymentStatus,
}

/// Adapter between the booking ledger and the external payment processor.
///
/// It charges the booking's stored canonical amount, converted to minor
/// units, and nothing else. Preconditions are checked before the processor
/// is ever contacted; a processor failure leaves the ledger untouched so the
/// booking can be retried.
pub struct CheckoutService {
    ledger: Arc<BookingLedger>,
    gateway: Arc<dyn PaymentGateway>,
}

impl CheckoutService {
    pub fn new(ledger: Arc<BookingLedger>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { ledger, gateway }
    }

    /// Create and immediately confirm a payment authorization for a booking.
    ///
    /// The create can succeed while the confirm fails; in that case the
    /// unconfirmed authorization is orphaned at the processor and the booking
    /// stays pending. No reconciliation channel exists for it here.
    pub async fn authorize_and_confirm(
        &self,
        booking_id: Uuid,
    ) -> Result<PaymentConfirmation, BookingError> {
        let booking = self.ledger.get(booking_id).await?;

        if !booking.is_payable() {
            return Err(BookingError::AlreadyPaid(booking_id));
        }

        let amount_minor = fee::to_minor_units(booking.amount_ngn);

        let intent = self
            .gateway
            .create_intent(booking_id, amount_minor, fee::CURRENCY)
            .await
            .map_err(|e| BookingError::PaymentFailed(e.to_string()))?;

        let confirmed = self
            .gateway
            .confirm_intent(&intent.id, SANDBOX_PAYMENT_METHOD)
            .await
            .map_err(|e| BookingError::PaymentFailed(e.to_string()))?;

        if confirmed.status != PaymentStatus::Succeeded {
            return Err(BookingError::PaymentFailed(format!(
                "processor returned {:?} for intent {}",
                confirmed.status, confirmed.id
            )));
        }

        info!(
            booking_id = %booking_id,
            reference = %confirmed.id,
            amount_minor,
            "Payment authorized and confirmed"
        );

        Ok(PaymentConfirmation {
            reference: confirmed.id,
            status: confirmed.status,
        })
    }
}

/// Demo-grade processor that authorizes and confirms every intent.
///
/// Intent ids encode the booking id so an orphaned authorization can still be
/// correlated with its booking by hand.
pub struct SandboxGateway;

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn create_intent(
        &self,
        booking_id: Uuid,
        amount_minor: i64,
        currency: &str,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>> {
        Ok(PaymentIntent {
            id: format!("sb_pi_{}", booking_id.simple()),
            booking_id,
            amount_minor,
            currency: currency.to_string(),
            status: PaymentStatus::RequiresConfirmation,
            client_secret: Some(format!("sb_secret_{}", Uuid::new_v4().simple())),
            created_at: chrono::Utc::now(),
        })
    }

    async fn confirm_intent(
        &self,
        intent_id: &str,
        _payment_method: &str,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>> {
        let booking_id_str = intent_id.strip_prefix("sb_pi_").unwrap_or_default();
        let booking_id = Uuid::parse_str(booking_id_str).unwrap_or_else(|_| Uuid::new_v4());

        Ok(PaymentIntent {
            id: intent_id.to_string(),
            booking_id,
            amount_minor: 0,
            currency: fee::CURRENCY.to_string(),
            status: PaymentStatus::Succeeded,
            client_secret: None,
            created_at: chrono::Utc::now(),
        })
    }
}
