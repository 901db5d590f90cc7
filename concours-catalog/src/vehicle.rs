use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Availability state of a unit of showroom inventory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    Available,
    Sold,
    Reserved,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "AVAILABLE",
            VehicleStatus::Sold => "SOLD",
            VehicleStatus::Reserved => "RESERVED",
        }
    }
}

impl std::str::FromStr for VehicleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(VehicleStatus::Available),
            "SOLD" => Ok(VehicleStatus::Sold),
            "RESERVED" => Ok(VehicleStatus::Reserved),
            other => Err(format!("Unknown vehicle status: {}", other)),
        }
    }
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vehicle in the showroom catalog. The booking core only ever reads these;
/// status changes (a sale, a reservation) happen through the back office.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub status: VehicleStatus,
    /// Listed price in whole naira. Absent while a listing is "price on request".
    pub price_ngn: Option<i64>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            VehicleStatus::Available,
            VehicleStatus::Sold,
            VehicleStatus::Reserved,
        ] {
            let parsed: VehicleStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("SCRAPPED".parse::<VehicleStatus>().is_err());
    }
}
