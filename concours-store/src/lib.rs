pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod redis_repo;
pub mod vehicle_repo;

pub use booking_repo::PgBookingRepository;
pub use database::DbClient;
pub use redis_repo::RedisClient;
pub use vehicle_repo::{PgSettingsRepository, PgVehicleRepository};
