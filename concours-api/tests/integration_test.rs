use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use concours_api::middleware::auth::{AdminClaims, CustomerClaims};
use concours_api::state::{AppState, AuthConfig, ResiliencyState};
use concours_api::app;
use concours_booking::memory::{FixedSettings, MemoryBookingRepository};
use concours_booking::{BookingLedger, BookingOrchestrator, CheckoutService, SandboxGateway};
use concours_catalog::availability::MemoryVehicleRepository;
use concours_catalog::vehicle::{Vehicle, VehicleStatus};
use concours_catalog::AvailabilityService;
use concours_store::RedisClient;

const SECRET: &str = "integration-test-secret";
const CANONICAL_FEE: i64 = 159_984;

async fn test_app() -> (Router, Arc<MemoryVehicleRepository>) {
    let vehicles = Arc::new(MemoryVehicleRepository::new());
    let availability = Arc::new(AvailabilityService::new(vehicles.clone()));
    let ledger = Arc::new(BookingLedger::new(Arc::new(MemoryBookingRepository::new())));
    let checkout = Arc::new(CheckoutService::new(ledger.clone(), Arc::new(SandboxGateway)));
    let orchestrator = Arc::new(BookingOrchestrator::new(
        availability.clone(),
        Arc::new(FixedSettings::new(Some(CANONICAL_FEE))),
        ledger.clone(),
        checkout,
        concours_catalog::fee::DEFAULT_TEST_DRIVE_FEE_NGN,
    ));

    // The URL is only parsed here; the limiter fails open when no Redis is
    // reachable, which is exactly what these tests rely on.
    let redis = Arc::new(RedisClient::new("redis://127.0.0.1:6379").await.unwrap());

    let state = AppState {
        orchestrator,
        ledger,
        availability,
        redis,
        auth: AuthConfig {
            secret: SECRET.to_string(),
            expiration: 3600,
        },
        rate_limit_per_minute: 10_000,
        resiliency: Arc::new(ResiliencyState::new()),
    };

    (app(state), vehicles)
}

fn seed_vehicle(vehicles: &MemoryVehicleRepository, status: VehicleStatus) -> Uuid {
    let now = chrono::Utc::now();
    let vehicle = Vehicle {
        id: Uuid::new_v4(),
        make: "Aston Martin".to_string(),
        model: "DB12".to_string(),
        year: 2025,
        status,
        price_ngn: Some(320_000_000),
        is_published: true,
        created_at: now,
        updated_at: now,
    };
    let id = vehicle.id;
    vehicles.insert(vehicle);
    id
}

fn customer_token() -> String {
    let claims = CustomerClaims {
        sub: "guest-integration".to_string(),
        email: None,
        role: "CUSTOMER".to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn admin_token(permissions: Vec<&str>) -> String {
    let claims = AdminClaims {
        sub: "admin-integration".to_string(),
        email: Some("back-office@example.com".to_string()),
        role: "ADMIN".to_string(),
        permissions: permissions.into_iter().map(String::from).collect(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let mut req = builder.body(body).unwrap();
    // axum only injects ConnectInfo when serving over a listener.
    req.extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 52000))));
    req
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn booking_payload(vehicle_id: Uuid) -> Value {
    json!({
        "vehicle_id": vehicle_id,
        "customer_name": "Ngozi Balogun",
        "customer_email": "ngozi@example.com",
        "customer_phone": "+2348031234567",
        "date": "2026-12-05",
        "time": "11:00",
        "location": "Victoria Island showroom",
        "notes": "Interested in the touring package"
    })
}

#[tokio::test]
async fn checkout_flow_creates_pays_and_conflicts_on_second_pay() {
    let (app, vehicles) = test_app().await;
    let vehicle_id = seed_vehicle(&vehicles, VehicleStatus::Available);

    // A guest token from the API itself is enough to book.
    let (status, body) = send(&app, request("POST", "/v1/auth/guest", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/v1/bookings",
            Some(&token),
            Some(booking_payload(vehicle_id)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["payment_status"], "PENDING");
    assert_eq!(body["amount_ngn"], CANONICAL_FEE);
    let booking_id = body["id"].as_str().unwrap().to_string();

    // Forged amount in the pay body is ignored.
    let pay_uri = format!("/v1/bookings/{}/pay", booking_id);
    let (status, body) = send(
        &app,
        request("POST", &pay_uri, Some(&token), Some(json!({"amount": 1}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "succeeded");
    assert!(body["reference"].as_str().unwrap().starts_with("sb_pi_"));

    let (status, body) = send(
        &app,
        request(
            "GET",
            &format!("/v1/bookings/{}", booking_id),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CONFIRMED");
    assert_eq!(body["payment_status"], "PAID");
    assert_eq!(body["amount_ngn"], CANONICAL_FEE);
    assert!(body["payment_reference"].as_str().unwrap().starts_with("sb_pi_"));

    // Second pay attempt is a conflict, not a second charge.
    let (status, _) = send(
        &app,
        request("POST", &pay_uri, Some(&token), Some(json!({}))),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn sold_vehicle_is_rejected_with_conflict() {
    let (app, vehicles) = test_app().await;
    let vehicle_id = seed_vehicle(&vehicles, VehicleStatus::Sold);
    let token = customer_token();

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/v1/bookings",
            Some(&token),
            Some(booking_payload(vehicle_id)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("not available"));
}

#[tokio::test]
async fn missing_phone_is_a_bad_request() {
    let (app, vehicles) = test_app().await;
    let vehicle_id = seed_vehicle(&vehicles, VehicleStatus::Available);
    let token = customer_token();

    let mut payload = booking_payload(vehicle_id);
    payload["customer_phone"] = json!("");

    let (status, body) = send(
        &app,
        request("POST", "/v1/bookings", Some(&token), Some(payload)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("customer_phone"));
}

#[tokio::test]
async fn booking_routes_require_a_customer_token() {
    let (app, vehicles) = test_app().await;
    let vehicle_id = seed_vehicle(&vehicles, VehicleStatus::Available);

    let (status, _) = send(
        &app,
        request("POST", "/v1/bookings", None, Some(booking_payload(vehicle_id))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // An admin token decodes but carries the wrong role for customer routes.
    let (status, _) = send(
        &app,
        request(
            "POST",
            "/v1/bookings",
            Some(&admin_token(vec!["bookings:write"])),
            Some(booking_payload(vehicle_id)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn availability_endpoint_is_public() {
    let (app, vehicles) = test_app().await;
    let vehicle_id = seed_vehicle(&vehicles, VehicleStatus::Reserved);

    let (status, body) = send(
        &app,
        request(
            "GET",
            &format!("/v1/vehicles/{}/availability", vehicle_id),
            None,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "RESERVED");

    let (status, _) = send(
        &app,
        request(
            "GET",
            &format!("/v1/vehicles/{}/availability", Uuid::new_v4()),
            None,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_cancel_enforces_permissions_and_guards() {
    let (app, vehicles) = test_app().await;
    let vehicle_id = seed_vehicle(&vehicles, VehicleStatus::Available);
    let token = customer_token();

    let (_, body) = send(
        &app,
        request(
            "POST",
            "/v1/bookings",
            Some(&token),
            Some(booking_payload(vehicle_id)),
        ),
    )
    .await;
    let booking_id = body["id"].as_str().unwrap().to_string();
    let cancel_uri = format!("/v1/admin/bookings/{}/cancel", booking_id);

    // No permission: forbidden, booking untouched.
    let (status, _) = send(
        &app,
        request("POST", &cancel_uri, Some(&admin_token(vec![])), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        request(
            "POST",
            &cancel_uri,
            Some(&admin_token(vec!["bookings:write"])),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CANCELLED");

    // Cancelling again is an invalid transition.
    let (status, _) = send(
        &app,
        request(
            "POST",
            &cancel_uri,
            Some(&admin_token(vec!["bookings:write"])),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn paid_booking_cannot_be_cancelled_but_can_be_completed() {
    let (app, vehicles) = test_app().await;
    let vehicle_id = seed_vehicle(&vehicles, VehicleStatus::Available);
    let token = customer_token();
    let admin = admin_token(vec!["bookings:write"]);

    let (_, body) = send(
        &app,
        request(
            "POST",
            "/v1/bookings",
            Some(&token),
            Some(booking_payload(vehicle_id)),
        ),
    )
    .await;
    let booking_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        request(
            "POST",
            &format!("/v1/bookings/{}/pay", booking_id),
            Some(&token),
            Some(json!({})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        request(
            "POST",
            &format!("/v1/admin/bookings/{}/cancel", booking_id),
            Some(&admin),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        request(
            "POST",
            &format!("/v1/admin/bookings/{}/complete", booking_id),
            Some(&admin),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "COMPLETED");
    assert_eq!(body["payment_status"], "PAID");
}
