use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use concours_booking::models::{Booking, CreateBookingRequest};
use concours_shared::pii::Masked;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub customer_name: String,
    pub customer_email: Masked<String>,
    pub customer_phone: Masked<String>,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub location: String,
    pub notes: Option<String>,
    pub status: String,
    pub payment_status: String,
    pub amount_ngn: i64,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            vehicle_id: booking.vehicle_id,
            customer_name: booking.customer_name,
            customer_email: Masked(booking.customer_email),
            customer_phone: Masked(booking.customer_phone),
            scheduled_date: booking.scheduled_date,
            scheduled_time: booking.scheduled_time,
            location: booking.location,
            notes: booking.notes,
            status: booking.status.as_str().to_string(),
            payment_status: booking.payment_status.as_str().to_string(),
            amount_ngn: booking.amount_ngn,
            payment_reference: booking.payment_reference,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PayBookingRequest {
    /// Accepted for client compatibility; the charge always uses the
    /// booking's canonical amount.
    pub amount: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub booking_id: Uuid,
    pub reference: String,
    pub status: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking))
        .route("/v1/bookings/{id}", get(get_booking))
        .route("/v1/bookings/{id}/pay", post(pay_booking))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/bookings
/// Step one of the checkout flow: validate and persist a pending booking
/// with the server-computed fee.
async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let booking = state.orchestrator.create(req).await?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// GET /v1/bookings/{id}
async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state.ledger.get(booking_id).await?;
    Ok(Json(booking.into()))
}

/// POST /v1/bookings/{id}/pay
/// Step two of the checkout flow: authorize and confirm payment against the
/// fee fixed at step one.
async fn pay_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<PayBookingRequest>,
) -> Result<Json<PaymentResponse>, AppError> {
    let confirmation = state.orchestrator.pay(booking_id, req.amount).await?;

    Ok(Json(PaymentResponse {
        booking_id,
        reference: confirmation.reference,
        status: "succeeded".to_string(),
    }))
}
