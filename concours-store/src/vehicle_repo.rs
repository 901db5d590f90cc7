use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use concours_catalog::availability::VehicleRepository;
use concours_catalog::vehicle::{Vehicle, VehicleStatus};
use concours_core::repository::SettingsRepository;
use concours_core::CoreError;

pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct VehicleRow {
    id: Uuid,
    make: String,
    model: String,
    year: i32,
    status: String,
    price_ngn: Option<i64>,
    is_published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl VehicleRepository for PgVehicleRepository {
    async fn fetch(
        &self,
        id: Uuid,
    ) -> Result<Option<Vehicle>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<VehicleRow> = sqlx::query_as(
            r#"
            SELECT id, make, model, year, status, price_ngn, is_published,
                   created_at, updated_at
            FROM vehicles WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let status: VehicleStatus = row.status.parse()?;
        Ok(Some(Vehicle {
            id: row.id,
            make: row.make,
            model: row.model,
            year: row.year,
            status,
            price_ngn: row.price_ngn,
            is_published: row.is_published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }
}

/// Reads the canonical test-drive fee from the `site_settings` table.
/// Rows hold `{"value": <number>}`, matching the back office's settings shape.
pub struct PgSettingsRepository {
    pool: PgPool,
}

impl PgSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for PgSettingsRepository {
    async fn test_drive_fee(
        &self,
    ) -> Result<Option<i64>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query("SELECT setting_value FROM site_settings WHERE setting_key = $1")
            .bind("test_drive_fee")
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let value: serde_json::Value = row.try_get("setting_value")?;
        match value.get("value").and_then(serde_json::Value::as_i64) {
            Some(fee) => Ok(Some(fee)),
            None => Err(Box::new(CoreError::ValidationError(format!(
                "site setting test_drive_fee holds no numeric value: {}",
                value
            )))),
        }
    }
}
