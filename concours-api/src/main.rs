use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use concours_api::{app, state::{AppState, AuthConfig, ResiliencyState}};
use concours_booking::{BookingLedger, BookingOrchestrator, CheckoutService, SandboxGateway};
use concours_catalog::AvailabilityService;
use concours_store::{
    DbClient, PgBookingRepository, PgSettingsRepository, PgVehicleRepository, RedisClient,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "concours_api=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = concours_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Concours API on port {}", config.server.port);

    // Database Connection
    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    // Redis Connection
    let redis_client = RedisClient::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");

    // Core wiring: availability reads, ledger, sandbox checkout, orchestrator
    let vehicle_repo = Arc::new(PgVehicleRepository::new(db.pool.clone()));
    let availability = Arc::new(AvailabilityService::new(vehicle_repo));

    let booking_repo = Arc::new(PgBookingRepository::new(db.pool.clone()));
    let ledger = Arc::new(BookingLedger::new(booking_repo));

    let checkout = Arc::new(CheckoutService::new(ledger.clone(), Arc::new(SandboxGateway)));

    let settings_repo = Arc::new(PgSettingsRepository::new(db.pool.clone()));
    let orchestrator = Arc::new(BookingOrchestrator::new(
        availability.clone(),
        settings_repo,
        ledger.clone(),
        checkout,
        config.business_rules.test_drive_fee_ngn,
    ));

    let app_state = AppState {
        orchestrator,
        ledger,
        availability,
        redis: Arc::new(redis_client),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        rate_limit_per_minute: config.business_rules.rate_limit_per_minute,
        resiliency: Arc::new(ResiliencyState::new()),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
