use axum::{
    extract::{Path, State},
    routing::post,
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::bookings::BookingResponse;
use crate::error::AppError;
use crate::middleware::auth::{has_permission, AdminClaims};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/bookings/{id}/cancel", post(cancel_booking))
        .route("/v1/admin/bookings/{id}/complete", post(complete_booking))
}

/// POST /v1/admin/bookings/{id}/cancel
/// Back-office transition: a pending booking the showroom will not honor.
async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    if !has_permission(&claims, "bookings:write") {
        return Err(AppError::AuthorizationError(
            "Missing permission: bookings:write".to_string(),
        ));
    }

    let booking = state.ledger.cancel(booking_id).await?;
    tracing::info!(booking_id = %booking_id, admin = %claims.sub, "Booking cancelled");
    Ok(Json(booking.into()))
}

/// POST /v1/admin/bookings/{id}/complete
/// Back-office transition after the test drive took place.
async fn complete_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    if !has_permission(&claims, "bookings:write") {
        return Err(AppError::AuthorizationError(
            "Missing permission: bookings:write".to_string(),
        ));
    }

    let booking = state.ledger.complete(booking_id).await?;
    tracing::info!(booking_id = %booking_id, admin = %claims.sub, "Booking completed");
    Ok(Json(booking.into()))
}
