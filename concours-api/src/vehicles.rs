use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use concours_catalog::CatalogError;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub vehicle_id: Uuid,
    pub status: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/vehicles/{id}/availability", get(vehicle_availability))
}

/// GET /v1/vehicles/{id}/availability
async fn vehicle_availability(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let status = state
        .availability
        .vehicle_availability(vehicle_id)
        .await
        .map_err(|e| match e {
            CatalogError::NotFound(id) => {
                AppError::NotFoundError(format!("Vehicle not found: {}", id))
            }
            CatalogError::Storage(msg) => AppError::InternalServerError(msg),
        })?;

    Ok(Json(AvailabilityResponse {
        vehicle_id,
        status: status.as_str().to_string(),
    }))
}
