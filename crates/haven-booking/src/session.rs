//! # Payment Session Manager
//!
//! Hands out one gateway payment session per pending booking.
//!
//! ## initiatePayment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  booking owned by user? ─────── no ──► NotFound                        │
//! │  booking pending? ───────────── no ──► InvalidState                    │
//! │  existing payment:                                                      │
//! │     paid ──────────────────────────► AlreadyPaid                       │
//! │     initiated + token ─────────────► same session again (no new order) │
//! │     failed / no token / none ──────► new gateway session               │
//! │                                                                         │
//! │  new session: auth → order → payment key → upsert(booking_id)          │
//! │  Any gateway failure returns Provider before anything is stored.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::booking::owned_booking;
use crate::error::{BookingError, BookingResult};
use crate::gateway::{BillingData, OrderRequest, PaymentGateway, PaymentKeyRequest};
use haven_core::{BookingStatus, PaymentStatus};
use haven_db::{Database, NewPaymentSession};

/// What the client needs to open the embedded checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentSession {
    pub booking_id: String,
    pub session_token: String,
    pub checkout_url: String,
    pub amount_cents: i64,
    pub currency: String,
}

/// Creates or reuses gateway sessions.
#[derive(Clone)]
pub struct PaymentSessionManager {
    db: Database,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentSessionManager {
    pub fn new(db: Database, gateway: Arc<dyn PaymentGateway>) -> Self {
        PaymentSessionManager { db, gateway }
    }

    /// Returns the booking's payment session, creating one only when no
    /// usable session is stored.
    pub async fn initiate_payment(&self, user_id: &str, booking_id: &str) -> BookingResult<PaymentSession> {
        let booking = owned_booking(&self.db, user_id, booking_id).await?;

        if booking.status != BookingStatus::Pending {
            return Err(BookingError::InvalidState(format!(
                "booking {} is {}",
                booking.id, booking.status
            )));
        }

        if let Some(existing) = self.db.payments().get_by_booking(&booking.id).await? {
            if existing.status == PaymentStatus::Paid {
                return Err(BookingError::AlreadyPaid(booking.id));
            }
            if let Some(token) = existing.reusable_session() {
                debug!(booking_id = %booking.id, "Reusing payment session");
                return Ok(PaymentSession {
                    booking_id: booking.id.clone(),
                    session_token: token.to_string(),
                    checkout_url: self.gateway.checkout_url(token),
                    amount_cents: existing.amount_cents,
                    currency: existing.currency.clone(),
                });
            }
        }

        let auth_token = self.gateway.authenticate().await.map_err(|e| {
            warn!(booking_id = %booking.id, error = %e, "Gateway authentication failed");
            BookingError::from(e)
        })?;

        let order = self
            .gateway
            .create_order(
                &auth_token,
                &OrderRequest {
                    merchant_order_id: booking.id.clone(),
                    amount_cents: booking.total_amount_cents,
                    currency: booking.currency.clone(),
                },
            )
            .await
            .map_err(|e| {
                warn!(booking_id = %booking.id, error = %e, "Gateway order creation failed");
                BookingError::from(e)
            })?;

        let token = self
            .gateway
            .create_payment_key(
                &auth_token,
                &PaymentKeyRequest {
                    order_id: order.id.clone(),
                    amount_cents: booking.total_amount_cents,
                    currency: booking.currency.clone(),
                    billing: BillingData::for_user(user_id),
                },
            )
            .await
            .map_err(|e| {
                warn!(booking_id = %booking.id, error = %e, "Gateway payment key failed");
                BookingError::from(e)
            })?;

        let payment = self
            .db
            .payments()
            .upsert_session(&NewPaymentSession {
                booking_id: booking.id.clone(),
                provider: self.gateway.provider().to_string(),
                provider_order_id: order.id.clone(),
                session_token: token.clone(),
                amount_cents: booking.total_amount_cents,
                currency: booking.currency.clone(),
                raw_payload: Some(order.raw.to_string()),
            })
            .await
            .map_err(|e| match BookingError::from(e) {
                // Paid by a callback while the session was being created
                BookingError::InvalidState(_) => BookingError::AlreadyPaid(booking.id.clone()),
                other => other,
            })?;

        info!(
            booking_id = %booking.id,
            provider_order_id = %order.id,
            amount_cents = payment.amount_cents,
            "Payment session created"
        );

        Ok(PaymentSession {
            booking_id: booking.id,
            checkout_url: self.gateway.checkout_url(&token),
            session_token: token,
            amount_cents: payment.amount_cents,
            currency: payment.currency,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{FailAt, InMemoryGateway};
    use crate::testing;

    async fn setup() -> (Database, InMemoryGateway, PaymentSessionManager, String) {
        let (db, room) = testing::db_with_room(26_000).await;
        let booking = testing::pending_booking(&db, &room, "u1", "2024-03-01", "2024-03-04").await;
        let gateway = InMemoryGateway::new();
        let manager = PaymentSessionManager::new(db.clone(), Arc::new(gateway.clone()));
        (db, gateway, manager, booking.id)
    }

    #[tokio::test]
    async fn test_second_call_reuses_session() {
        let (_db, gateway, manager, booking_id) = setup().await;

        let first = manager.initiate_payment("u1", &booking_id).await.unwrap();
        let second = manager.initiate_payment("u1", &booking_id).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.amount_cents, 78_000);
        assert_eq!(first.currency, "USD");
        assert!(first.checkout_url.ends_with(&first.session_token));
        assert_eq!(gateway.order_count().await, 1);
    }

    #[tokio::test]
    async fn test_other_users_booking_is_not_found() {
        let (_db, gateway, manager, booking_id) = setup().await;
        assert!(matches!(
            manager.initiate_payment("u2", &booking_id).await,
            Err(BookingError::NotFound { .. })
        ));
        assert_eq!(gateway.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_gateway_failure_stores_nothing() {
        let (db, gateway, manager, booking_id) = setup().await;
        gateway.set_fail_at(Some(FailAt::PaymentKey)).await;

        assert!(matches!(
            manager.initiate_payment("u1", &booking_id).await,
            Err(BookingError::Provider(_))
        ));
        assert!(db.payments().get_by_booking(&booking_id).await.unwrap().is_none());
        assert_eq!(gateway.key_count().await, 0);

        gateway.set_fail_at(Some(FailAt::Auth)).await;
        assert!(matches!(
            manager.initiate_payment("u1", &booking_id).await,
            Err(BookingError::Provider(_))
        ));

        gateway.set_fail_at(None).await;
        manager.initiate_payment("u1", &booking_id).await.unwrap();
        assert!(db.payments().get_by_booking(&booking_id).await.unwrap().is_some());
        assert_eq!(gateway.key_count().await, 1);
    }

    #[tokio::test]
    async fn test_failed_payment_gets_fresh_session() {
        let (db, gateway, manager, booking_id) = setup().await;
        let first = manager.initiate_payment("u1", &booking_id).await.unwrap();
        db.payments().reconcile(&booking_id, Some("1001"), false, "{}").await.unwrap();

        let second = manager.initiate_payment("u1", &booking_id).await.unwrap();
        assert_ne!(first.session_token, second.session_token);
        assert_eq!(gateway.order_count().await, 2);

        let payment = db.payments().get_by_booking(&booking_id).await.unwrap().unwrap();
        assert_eq!(payment.status, PaymentStatus::Initiated);
    }

    #[tokio::test]
    async fn test_state_guards() {
        let (db, _gateway, manager, booking_id) = setup().await;
        manager.initiate_payment("u1", &booking_id).await.unwrap();
        db.payments().reconcile(&booking_id, Some("1001"), true, "{}").await.unwrap();

        // Booking confirmed by the callback
        assert!(matches!(
            manager.initiate_payment("u1", &booking_id).await,
            Err(BookingError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_paid_but_unconfirmed_is_already_paid() {
        let (db, room) = testing::db_with_room(10_000).await;
        let taken = testing::pending_booking(&db, &room, "u1", "2024-03-01", "2024-03-04").await;
        let loser = testing::pending_booking(&db, &room, "u2", "2024-03-02", "2024-03-05").await;
        let manager = PaymentSessionManager::new(db.clone(), Arc::new(InMemoryGateway::new()));

        manager.initiate_payment("u1", &taken.id).await.unwrap();
        manager.initiate_payment("u2", &loser.id).await.unwrap();
        db.payments().reconcile(&taken.id, Some("1001"), true, "{}").await.unwrap();
        db.payments().reconcile(&loser.id, Some("1002"), true, "{}").await.unwrap();

        // Loser's money was captured but the booking stayed pending
        assert!(matches!(
            manager.initiate_payment("u2", &loser.id).await,
            Err(BookingError::AlreadyPaid(_))
        ));
    }
}
