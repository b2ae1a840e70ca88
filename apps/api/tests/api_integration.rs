//! Integration tests for the API server.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use haven_api::config::GatewayKind;
use haven_api::{create_app, ApiConfig, AppState, JwtManager};
use haven_booking::{CallbackSigner, InMemoryGateway, TransactionCallback};
use haven_core::{Hotel, Room};
use haven_db::{Database, DbConfig};

const JWT_SECRET: &str = "test-jwt-secret";
const HMAC_SECRET: &str = "test-hmac-secret";

struct TestApp {
    app: Router,
    db: Database,
    room_id: String,
}

fn config() -> ApiConfig {
    let mut config = ApiConfig {
        gateway: GatewayKind::Memory,
        jwt_secret: JWT_SECRET.to_string(),
        ..ApiConfig::default()
    };
    config.paymob.hmac_secret = HMAC_SECRET.to_string();
    config
}

async fn setup() -> TestApp {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    let hotel = Hotel {
        id: "hotel-1".to_string(),
        name: "Nile View".to_string(),
        city: "Cairo".to_string(),
        created_at: Utc::now(),
    };
    db.rooms().insert_hotel(&hotel).await.unwrap();
    let room = Room {
        id: "room-1".to_string(),
        hotel_id: hotel.id.clone(),
        name: "Deluxe King".to_string(),
        capacity: 2,
        price_per_night_cents: 26_000,
        currency: "USD".to_string(),
        created_at: Utc::now(),
    };
    db.rooms().insert_room(&room).await.unwrap();

    let state = AppState::new(db.clone(), Arc::new(InMemoryGateway::new()), &config()).unwrap();
    TestApp {
        app: create_app(Arc::new(state)),
        db,
        room_id: room.id,
    }
}

fn token(user_id: &str) -> String {
    JwtManager::new(JWT_SECRET, 3600)
        .generate_access_token(user_id)
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn call(app: &Router, method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("authorization", format!("Bearer {}", token(user)));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let (status, bytes) = send(app, request).await;
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn transaction(booking_id: &str, success: bool) -> Value {
    json!({
        "id": 5001,
        "amount_cents": 78000,
        "created_at": "2024-03-01T10:15:30",
        "currency": "USD",
        "error_occured": false,
        "integration_id": 42,
        "is_3d_secure": true,
        "is_auth": false,
        "is_capture": false,
        "is_refunded": false,
        "is_voided": false,
        "is_standalone_payment": true,
        "order": { "id": 1001, "merchant_order_id": booking_id },
        "owner": 77,
        "pending": false,
        "source_data": { "pan": "2346", "sub_type": "MasterCard", "type": "card" },
        "success": success
    })
}

fn sign(obj: &Value) -> String {
    let callback = TransactionCallback::from_json(obj.to_string().as_bytes()).unwrap();
    CallbackSigner::new(HMAC_SECRET).unwrap().sign(&callback)
}

async fn post_webhook(app: &Router, obj: &Value, hmac: &str) -> (StatusCode, Vec<u8>) {
    let envelope = json!({ "type": "TRANSACTION", "obj": obj });
    let request = Request::builder()
        .method("POST")
        .uri(format!("/payments/webhook?hmac={}", hmac))
        .header("content-type", "application/json")
        .body(Body::from(envelope.to_string()))
        .unwrap();
    send(app, request).await
}

async fn create_booking(t: &TestApp, user: &str, check_in: &str, check_out: &str) -> (StatusCode, Value) {
    call(
        &t.app,
        "POST",
        "/bookings",
        Some(user),
        Some(json!({ "room_id": t.room_id, "check_in": check_in, "check_out": check_out })),
    )
    .await
}

#[tokio::test]
async fn test_health_check() {
    let t = setup().await;
    let (status, json) = call(&t.app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], true);
}

#[tokio::test]
async fn test_bookings_require_bearer_token() {
    let t = setup().await;

    let (status, json) = call(&t.app, "GET", "/bookings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "unauthenticated");

    let request = Request::builder()
        .uri("/bookings")
        .header("authorization", "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_booking_quotes_server_side() {
    let t = setup().await;

    let (status, json) = create_booking(&t, "u1", "2024-03-01", "2024-03-04").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["nights"], 3);
    assert_eq!(json["total_amount_cents"], 78_000);
    assert_eq!(json["status"], "pending");

    let (status, json) = create_booking(&t, "u1", "2024-03-04", "2024-03-04").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "invalid_date_range");

    let (status, json) = call(&t.app, "POST", "/bookings", Some("u1"), Some(json!({ "room_id": "nope", "check_in": "2024-03-01", "check_out": "2024-03-02" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "room_not_found");

    let (status, _) = call(&t.app, "POST", "/bookings", Some("u1"), Some(json!({ "room_id": t.room_id }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_other_users_booking_is_not_found() {
    let t = setup().await;
    let (_, booking) = create_booking(&t, "u1", "2024-03-01", "2024-03-04").await;
    let id = booking["id"].as_str().unwrap();

    let (status, _) = call(&t.app, "GET", &format!("/bookings/{}", id), Some("u2"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = call(&t.app, "GET", &format!("/bookings/{}", id), Some("u1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], id);
    assert_eq!(json["payment_status"], Value::Null);
}

#[tokio::test]
async fn test_full_payment_flow() {
    let t = setup().await;
    let (_, booking) = create_booking(&t, "u1", "2024-03-01", "2024-03-04").await;
    let id = booking["id"].as_str().unwrap().to_string();

    // Session is reused on a second request
    let (status, first) = call(&t.app, "POST", "/payments/session", Some("u1"), Some(json!({ "booking_id": id }))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = call(&t.app, "POST", "/payments/session", Some("u1"), Some(json!({ "booking_id": id }))).await;
    assert_eq!(first["session_token"], second["session_token"]);
    assert_eq!(first["amount_cents"], 78_000);

    // Gateway delivers the success three times
    let obj = transaction(&id, true);
    let hmac = sign(&obj);
    for _ in 0..3 {
        let (status, body) = post_webhook(&t.app, &obj, &hmac).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");
    }

    let (_, details) = call(&t.app, "GET", &format!("/bookings/{}", id), Some("u1"), None).await;
    assert_eq!(details["status"], "confirmed");
    assert_eq!(details["payment_status"], "paid");

    let (_, notifications) = call(&t.app, "GET", "/notifications", Some("u1"), None).await;
    let notifications = notifications.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["kind"], "booking_confirmed");

    // Confirmed dates now block an overlapping request
    let (status, json) = create_booking(&t, "u2", "2024-03-02", "2024-03-05").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "room_unavailable");

    let (status, _) = call(&t.app, "POST", &format!("/bookings/{}/cancel", id), Some("u1"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_tampered_webhook_is_rejected() {
    let t = setup().await;
    let (_, booking) = create_booking(&t, "u1", "2024-03-01", "2024-03-04").await;
    let id = booking["id"].as_str().unwrap().to_string();
    call(&t.app, "POST", "/payments/session", Some("u1"), Some(json!({ "booking_id": id }))).await;

    let declined_hmac = sign(&transaction(&id, false));
    let (status, _) = post_webhook(&t.app, &transaction(&id, true), &declined_hmac).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let booking = t.db.bookings().get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(booking.status.as_str(), "pending");
}

#[tokio::test]
async fn test_response_callback_via_query() {
    let t = setup().await;
    let (_, booking) = create_booking(&t, "u1", "2024-03-01", "2024-03-04").await;
    let id = booking["id"].as_str().unwrap().to_string();
    call(&t.app, "POST", "/payments/session", Some("u1"), Some(json!({ "booking_id": id }))).await;

    let hmac = sign(&transaction(&id, false));
    let query = format!(
        "amount_cents=78000&created_at=2024-03-01T10:15:30&currency=USD&error_occured=false\
         &id=5001&integration_id=42&is_3d_secure=true&is_auth=false&is_capture=false\
         &is_refunded=false&is_voided=false&is_standalone_payment=true&order=1001&owner=77\
         &pending=false&source_data.pan=2346&source_data.sub_type=MasterCard\
         &source_data.type=card&success=false&merchant_order_id={}&hmac={}",
        id, hmac
    );
    let request = Request::builder()
        .uri(format!("/payments/webhook?{}", query))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");

    let (_, details) = call(&t.app, "GET", &format!("/bookings/{}", id), Some("u1"), None).await;
    assert_eq!(details["status"], "pending");
    assert_eq!(details["payment_status"], "failed");
}

#[tokio::test]
async fn test_availability_and_notifications_read() {
    let t = setup().await;

    let (status, rooms) = call(&t.app, "GET", "/rooms/available?city=Cairo&check_in=2024-03-01&check_out=2024-03-04", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rooms.as_array().unwrap().len(), 1);
    assert_eq!(rooms[0]["hotel_name"], "Nile View");

    let (status, json) = call(&t.app, "GET", "/rooms/available?check_in=2024-03-01", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "invalid_input");

    let (status, _) = call(&t.app, "POST", "/notifications/missing/read", Some("u1"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
