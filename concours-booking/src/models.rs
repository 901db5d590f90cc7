use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::BookingError;

/// Lifecycle status of a test-drive booking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "COMPLETED" => Ok(BookingStatus::Completed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            other => Err(format!("Unknown booking status: {}", other)),
        }
    }
}

/// Payment sub-state of a booking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentState {
    Pending,
    Paid,
    Refunded,
}

impl PaymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Pending => "PENDING",
            PaymentState::Paid => "PAID",
            PaymentState::Refunded => "REFUNDED",
        }
    }
}

impl std::str::FromStr for PaymentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentState::Pending),
            "PAID" => Ok(PaymentState::Paid),
            "REFUNDED" => Ok(PaymentState::Refunded),
            other => Err(format!("Unknown payment state: {}", other)),
        }
    }
}

/// A customer's reserved test-drive slot for a specific vehicle.
///
/// `status` and `payment_status` only ever move together through the ledger's
/// guarded transitions; `amount_ngn` is fixed at creation from the site-wide
/// fee setting and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub location: String,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub payment_status: PaymentState,
    /// Server-computed canonical fee in whole naira, snapshotted at creation.
    pub amount_ngn: i64,
    /// Processor reference, set exactly once when payment is confirmed.
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(details: ValidatedBooking, canonical_fee_ngn: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            vehicle_id: details.vehicle_id,
            customer_name: details.customer_name,
            customer_email: details.customer_email,
            customer_phone: details.customer_phone,
            scheduled_date: details.scheduled_date,
            scheduled_time: details.scheduled_time,
            location: details.location,
            notes: details.notes,
            status: BookingStatus::Pending,
            payment_status: PaymentState::Pending,
            amount_ngn: canonical_fee_ngn,
            payment_reference: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether a payment may still be initiated against this booking.
    pub fn is_payable(&self) -> bool {
        self.payment_status != PaymentState::Paid && self.status != BookingStatus::Confirmed
    }

    /// Flip `payment_status` and `status` together on confirmed payment and
    /// record the processor reference. The two fields never move apart.
    pub fn settle_payment(&mut self, reference: &str) {
        self.payment_status = PaymentState::Paid;
        self.status = BookingStatus::Confirmed;
        self.payment_reference = Some(reference.to_string());
        self.updated_at = Utc::now();
    }
}

/// Raw client input for booking creation, before server-side validation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub vehicle_id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub notes: Option<String>,
}

/// Booking details that passed field validation.
#[derive(Debug, Clone)]
pub struct ValidatedBooking {
    pub vehicle_id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub location: String,
    pub notes: Option<String>,
}

impl CreateBookingRequest {
    /// Validate required fields. Missing or malformed input is a hard
    /// failure, never defaulted.
    pub fn validate(&self) -> Result<ValidatedBooking, BookingError> {
        let customer_name = required(&self.customer_name, "customer_name")?;
        let customer_email = required(&self.customer_email, "customer_email")?;
        if !customer_email.contains('@') {
            return Err(BookingError::InvalidField {
                field: "customer_email",
                reason: "not an email address".to_string(),
            });
        }
        let customer_phone = required(&self.customer_phone, "customer_phone")?;
        let location = required(&self.location, "location")?;

        let date = required(&self.date, "date")?;
        let scheduled_date: NaiveDate =
            date.parse().map_err(|_| BookingError::InvalidField {
                field: "date",
                reason: format!("expected YYYY-MM-DD, got {:?}", date),
            })?;

        let time = required(&self.time, "time")?;
        let scheduled_time = NaiveTime::parse_from_str(&time, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&time, "%H:%M:%S"))
            .map_err(|_| BookingError::InvalidField {
                field: "time",
                reason: format!("expected HH:MM, got {:?}", time),
            })?;

        Ok(ValidatedBooking {
            vehicle_id: self.vehicle_id,
            customer_name,
            customer_email,
            customer_phone,
            scheduled_date,
            scheduled_time,
            location,
            notes: self.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()).map(String::from),
        })
    }
}

fn required(value: &str, field: &'static str) -> Result<String, BookingError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BookingError::MissingField(field));
    }
    Ok(trimmed.to_string())
}
