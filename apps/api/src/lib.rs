//! # Haven API
//!
//! HTTP surface for room search, bookings, payment sessions and gateway
//! callbacks.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Haven API Routes                               │
//! │                                                                         │
//! │  public      GET  /health                                              │
//! │              GET  /rooms/available                                     │
//! │                                                                         │
//! │  bearer      POST /bookings            GET  /bookings                  │
//! │              GET  /bookings/{id}       POST /bookings/{id}/cancel      │
//! │              POST /payments/session                                    │
//! │              GET  /notifications       POST /notifications/{id}/read   │
//! │                                                                         │
//! │  signed      POST /payments/webhook    (processed callback, JSON)      │
//! │              GET  /payments/webhook    (response callback, query)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`config::ApiConfig`]):
//! - `HAVEN_DATABASE_PATH` - SQLite file (default: haven.db)
//! - `HAVEN_PORT` - HTTP port (default: 8080)
//! - `HAVEN_JWT_SECRET` - Secret for bearer token verification
//! - `HAVEN_GATEWAY` - `paymob` or `memory`
//! - `HAVEN_PAYMOB__API_KEY`, `HAVEN_PAYMOB__INTEGRATION_ID`,
//!   `HAVEN_PAYMOB__IFRAME_ID`, `HAVEN_PAYMOB__HMAC_SECRET`
//! - `HAVEN_WEBHOOK_SIGNATURE_SOFT_FAIL` - debug only (default: false)

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use haven_booking::{
    BookingManager, CallbackSigner, PaymentGateway, PaymentSessionManager, WebhookReconciler,
};
use haven_db::Database;

pub use auth::{AuthUser, JwtManager};
pub use config::ApiConfig;
pub use error::ApiError;

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub bookings: BookingManager,
    pub sessions: PaymentSessionManager,
    pub webhooks: WebhookReconciler,
    pub jwt: JwtManager,
}

impl AppState {
    /// Wires the services over one store handle and one gateway.
    pub fn new(
        db: Database,
        gateway: Arc<dyn PaymentGateway>,
        config: &ApiConfig,
    ) -> Result<Self, ApiError> {
        let signer = CallbackSigner::new(&config.paymob.hmac_secret)?;

        Ok(AppState {
            bookings: BookingManager::new(db.clone()),
            sessions: PaymentSessionManager::new(db.clone(), gateway),
            webhooks: WebhookReconciler::new(db.clone(), signer, config.webhook_signature_soft_fail),
            jwt: JwtManager::new(&config.jwt_secret, config.jwt_access_lifetime_secs),
            db,
        })
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::check))
        .route("/rooms/available", get(routes::rooms::available))
        .route("/bookings", post(routes::bookings::create).get(routes::bookings::list))
        .route("/bookings/{id}", get(routes::bookings::get))
        .route("/bookings/{id}/cancel", post(routes::bookings::cancel))
        .route("/payments/session", post(routes::payments::create_session))
        .route(
            "/payments/webhook",
            post(routes::payments::processed_callback).get(routes::payments::response_callback),
        )
        .route("/notifications", get(routes::notifications::list))
        .route("/notifications/{id}/read", post(routes::notifications::mark_read))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
