//! In-memory gateway for tests and local development.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{GatewayError, GatewayResult, OrderRequest, PaymentGateway, PaymentKeyRequest, ProviderOrder};
use haven_core::PAYMENT_PROVIDER;

/// Which call should fail next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Auth,
    Order,
    PaymentKey,
}

#[derive(Debug, Default)]
struct InMemoryGatewayState {
    /// merchant_order_id of every order created, in order.
    orders: Vec<String>,
    keys_issued: u32,
    fail_at: Option<FailAt>,
}

/// Gateway that hands out sequential order ids and tokens.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    state: Arc<Mutex<InMemoryGatewayState>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the given call fail until cleared with `None`.
    pub async fn set_fail_at(&self, stage: Option<FailAt>) {
        self.state.lock().await.fail_at = stage;
    }

    /// Number of provider orders created.
    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }

    /// Number of payment keys issued.
    pub async fn key_count(&self) -> u32 {
        self.state.lock().await.keys_issued
    }

    async fn check(&self, stage: FailAt) -> GatewayResult<()> {
        if self.state.lock().await.fail_at == Some(stage) {
            return Err(GatewayError::Status {
                stage: match stage {
                    FailAt::Auth => "auth",
                    FailAt::Order => "order",
                    FailAt::PaymentKey => "payment_key",
                },
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for InMemoryGateway {
    fn provider(&self) -> &'static str {
        PAYMENT_PROVIDER
    }

    async fn authenticate(&self) -> GatewayResult<String> {
        self.check(FailAt::Auth).await?;
        Ok("memory-auth".to_string())
    }

    async fn create_order(&self, _auth_token: &str, order: &OrderRequest) -> GatewayResult<ProviderOrder> {
        self.check(FailAt::Order).await?;
        let mut state = self.state.lock().await;
        state.orders.push(order.merchant_order_id.clone());
        let id = (1000 + state.orders.len()).to_string();

        Ok(ProviderOrder {
            raw: json!({
                "id": id,
                "merchant_order_id": order.merchant_order_id,
                "amount_cents": order.amount_cents,
                "currency": order.currency,
            }),
            id,
        })
    }

    async fn create_payment_key(&self, _auth_token: &str, key: &PaymentKeyRequest) -> GatewayResult<String> {
        self.check(FailAt::PaymentKey).await?;
        let mut state = self.state.lock().await;
        state.keys_issued += 1;
        Ok(format!("memory-key-{}-{}", key.order_id, state.keys_issued))
    }

    fn checkout_url(&self, payment_token: &str) -> String {
        format!("https://checkout.invalid/iframes/0?payment_token={}", payment_token)
    }
}
