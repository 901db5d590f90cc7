use std::sync::Arc;
use std::time::Duration;

use concours_booking::{BookingLedger, BookingOrchestrator};
use concours_catalog::AvailabilityService;
use concours_store::RedisClient;

use crate::middleware::resiliency::CircuitBreaker;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

pub struct ResiliencyState {
    pub payment_cb: CircuitBreaker,
}

impl ResiliencyState {
    pub fn new() -> Self {
        Self {
            payment_cb: CircuitBreaker::new("payment", 5, Duration::from_secs(30)),
        }
    }
}

impl Default for ResiliencyState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<BookingOrchestrator>,
    pub ledger: Arc<BookingLedger>,
    pub availability: Arc<AvailabilityService>,
    pub redis: Arc<RedisClient>,
    pub auth: AuthConfig,
    pub rate_limit_per_minute: i64,
    pub resiliency: Arc<ResiliencyState>,
}
