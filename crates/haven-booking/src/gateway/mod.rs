//! # Payment Gateway
//!
//! The three calls a payment session needs, behind one trait.
//!
//! ## Session Handshake
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PaymentSessionManager                     Gateway (Paymob Accept)     │
//! │        │                                                                │
//! │        │── authenticate() ───────────────► POST /auth/tokens            │
//! │        │◄──────────────────── auth token ─┘                             │
//! │        │── create_order(merchant_order_id = booking id)                 │
//! │        │                     ────────────► POST /ecommerce/orders       │
//! │        │◄──────────────────── order id ───┘                             │
//! │        │── create_payment_key(order id, amount, currency)              │
//! │        │                     ────────────► POST /acceptance/payment_keys│
//! │        │◄──────────────────── payment token                             │
//! │        │                                                                │
//! │        └── checkout_url(token) → embeddable iframe URL                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`PaymobClient`] talks to the real API; [`InMemoryGateway`] stands in
//! for it in tests.

mod memory;
mod paymob;

pub use memory::{FailAt, InMemoryGateway};
pub use paymob::PaymobClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for gateway calls.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gateway call failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The HTTP request never produced a response.
    #[error("{stage} request failed: {message}")]
    Request { stage: &'static str, message: String },

    /// The gateway answered with a non-success status.
    #[error("{stage} returned HTTP {status}: {body}")]
    Status {
        stage: &'static str,
        status: u16,
        body: String,
    },

    /// The response body was not what the API documents.
    #[error("{stage} returned an unexpected body: {reason}")]
    InvalidResponse { stage: &'static str, reason: String },

    /// Client could not be built from the configuration.
    #[error("Invalid gateway configuration: {0}")]
    Config(String),
}

/// Gateway settings, loaded by the API from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// e.g. `https://accept.paymob.com/api`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub integration_id: i64,
    #[serde(default)]
    pub iframe_id: i64,
    /// Shared secret for callback signatures.
    #[serde(default)]
    pub hmac_secret: String,
    /// Lifetime of a payment key at the gateway.
    #[serde(default = "default_expiration")]
    pub payment_key_expiration_secs: u64,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://accept.paymob.com/api".to_string()
}

fn default_expiration() -> u64 {
    3600
}

fn default_timeout() -> u64 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            base_url: default_base_url(),
            api_key: String::new(),
            integration_id: 0,
            iframe_id: 0,
            hmac_secret: String::new(),
            payment_key_expiration_secs: default_expiration(),
            request_timeout_secs: default_timeout(),
        }
    }
}

/// A provider-side order for one booking.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    /// Our booking id; comes back in every callback.
    pub merchant_order_id: String,
    pub amount_cents: i64,
    pub currency: String,
}

/// The order the gateway created.
#[derive(Debug, Clone)]
pub struct ProviderOrder {
    pub id: String,
    /// Full response body, kept for audit.
    pub raw: serde_json::Value,
}

/// Billing details the payment key call requires.
///
/// Users are opaque ids here, so the gateway's `NA` placeholder fills
/// every field it does not validate.
#[derive(Debug, Clone, Serialize)]
pub struct BillingData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub apartment: String,
    pub floor: String,
    pub street: String,
    pub building: String,
    pub city: String,
    pub country: String,
    pub state: String,
    pub postal_code: String,
    pub shipping_method: String,
}

impl BillingData {
    /// Billing data for a user known only by id.
    pub fn for_user(user_id: &str) -> Self {
        let na = || "NA".to_string();
        BillingData {
            first_name: "Guest".to_string(),
            last_name: user_id.to_string(),
            email: format!("{}@guests.haven.local", user_id),
            phone_number: na(),
            apartment: na(),
            floor: na(),
            street: na(),
            building: na(),
            city: na(),
            country: na(),
            state: na(),
            postal_code: na(),
            shipping_method: na(),
        }
    }
}

/// A payment key request for an existing provider order.
#[derive(Debug, Clone)]
pub struct PaymentKeyRequest {
    pub order_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub billing: BillingData,
}

/// The gateway operations a payment session needs.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Provider name stored on payment rows.
    fn provider(&self) -> &'static str;

    /// Exchanges the API key for a short-lived auth token.
    async fn authenticate(&self) -> GatewayResult<String>;

    /// Registers an order for the booking.
    async fn create_order(&self, auth_token: &str, order: &OrderRequest) -> GatewayResult<ProviderOrder>;

    /// Issues the payment token the checkout iframe consumes.
    async fn create_payment_key(&self, auth_token: &str, key: &PaymentKeyRequest) -> GatewayResult<String>;

    /// Embeddable checkout URL for a payment token.
    fn checkout_url(&self, payment_token: &str) -> String;
}
