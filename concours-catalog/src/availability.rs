use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::vehicle::{Vehicle, VehicleStatus};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Vehicle not found: {0}")]
    NotFound(Uuid),

    #[error("Catalog storage error: {0}")]
    Storage(String),
}

/// Repository trait for vehicle data access.
#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn fetch(
        &self,
        id: Uuid,
    ) -> Result<Option<Vehicle>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Read-only availability lookups against the vehicle catalog.
///
/// This is a pure read with no side effects; a missing vehicle is a
/// `NotFound` rejection for the caller, never retried here.
pub struct AvailabilityService {
    repo: Arc<dyn VehicleRepository>,
}

impl AvailabilityService {
    pub fn new(repo: Arc<dyn VehicleRepository>) -> Self {
        Self { repo }
    }

    pub async fn vehicle_availability(&self, id: Uuid) -> Result<VehicleStatus, CatalogError> {
        let vehicle = self
            .repo
            .fetch(id)
            .await
            .map_err(|e| CatalogError::Storage(e.to_string()))?
            .ok_or(CatalogError::NotFound(id))?;

        Ok(vehicle.status)
    }
}

/// In-memory vehicle repository, used by tests and demo wiring.
pub struct MemoryVehicleRepository {
    vehicles: std::sync::Mutex<std::collections::HashMap<Uuid, Vehicle>>,
}

impl MemoryVehicleRepository {
    pub fn new() -> Self {
        Self {
            vehicles: std::sync::Mutex::new(std::collections::HashMap::new()),
        }
    }

    pub fn insert(&self, vehicle: Vehicle) {
        self.vehicles.lock().unwrap().insert(vehicle.id, vehicle);
    }
}

impl Default for MemoryVehicleRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VehicleRepository for MemoryVehicleRepository {
    async fn fetch(
        &self,
        id: Uuid,
    ) -> Result<Option<Vehicle>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.vehicles.lock().unwrap().get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn showroom_vehicle(status: VehicleStatus) -> Vehicle {
        let now = Utc::now();
        Vehicle {
            id: Uuid::new_v4(),
            make: "Bentley".to_string(),
            model: "Continental GT".to_string(),
            year: 2024,
            status,
            price_ngn: Some(450_000_000),
            is_published: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn reports_status_for_a_known_vehicle() {
        let repo = Arc::new(MemoryVehicleRepository::new());
        let vehicle = showroom_vehicle(VehicleStatus::Available);
        let id = vehicle.id;
        repo.insert(vehicle);

        let service = AvailabilityService::new(repo);
        assert_eq!(
            service.vehicle_availability(id).await.unwrap(),
            VehicleStatus::Available
        );
    }

    #[tokio::test]
    async fn unknown_vehicle_is_not_found() {
        let service = AvailabilityService::new(Arc::new(MemoryVehicleRepository::new()));
        let result = service.vehicle_availability(Uuid::new_v4()).await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }
}
