//! Paymob Accept API client.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use super::{
    GatewayConfig, GatewayError, GatewayResult, OrderRequest, PaymentGateway, PaymentKeyRequest,
    ProviderOrder,
};
use haven_core::PAYMENT_PROVIDER;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// HTTP client for the Paymob Accept API.
#[derive(Debug, Clone)]
pub struct PaymobClient {
    client: Client,
    config: GatewayConfig,
}

impl PaymobClient {
    /// Builds a client with the configured request timeout.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        Ok(PaymobClient { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// POSTs a JSON body and returns the parsed JSON response.
    async fn post(&self, stage: &'static str, path: &str, body: &Value) -> GatewayResult<Value> {
        debug!(stage, path, "Calling payment gateway");

        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Request {
                stage,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(stage, status = status.as_u16(), "Gateway call rejected");
            return Err(GatewayError::Status {
                stage,
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| GatewayError::InvalidResponse {
                stage,
                reason: e.to_string(),
            })
    }
}

fn decode<T: DeserializeOwned>(stage: &'static str, value: Value) -> GatewayResult<T> {
    serde_json::from_value(value).map_err(|e| GatewayError::InvalidResponse {
        stage,
        reason: e.to_string(),
    })
}

#[async_trait]
impl PaymentGateway for PaymobClient {
    fn provider(&self) -> &'static str {
        PAYMENT_PROVIDER
    }

    async fn authenticate(&self) -> GatewayResult<String> {
        let body = json!({ "api_key": self.config.api_key });
        let response = self.post("auth", "auth/tokens", &body).await?;
        Ok(decode::<TokenResponse>("auth", response)?.token)
    }

    async fn create_order(&self, auth_token: &str, order: &OrderRequest) -> GatewayResult<ProviderOrder> {
        let body = json!({
            "auth_token": auth_token,
            "delivery_needed": false,
            "amount_cents": order.amount_cents,
            "currency": order.currency,
            "merchant_order_id": order.merchant_order_id,
            "items": [],
        });
        let raw = self.post("order", "ecommerce/orders", &body).await?;

        // Order ids are numbers in responses and strings in some sandboxes
        let id = match raw.get("id") {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => {
                return Err(GatewayError::InvalidResponse {
                    stage: "order",
                    reason: "missing order id".to_string(),
                })
            }
        };

        Ok(ProviderOrder { id, raw })
    }

    async fn create_payment_key(&self, auth_token: &str, key: &PaymentKeyRequest) -> GatewayResult<String> {
        let body = json!({
            "auth_token": auth_token,
            "amount_cents": key.amount_cents,
            "expiration": self.config.payment_key_expiration_secs,
            "order_id": key.order_id,
            "billing_data": key.billing,
            "currency": key.currency,
            "integration_id": self.config.integration_id,
        });
        let response = self.post("payment_key", "acceptance/payment_keys", &body).await?;
        Ok(decode::<TokenResponse>("payment_key", response)?.token)
    }

    fn checkout_url(&self, payment_token: &str) -> String {
        format!(
            "{}?payment_token={}",
            self.url(&format!("acceptance/iframes/{}", self.config.iframe_id)),
            payment_token
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
