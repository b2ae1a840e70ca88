//! # Webhook Reconciler
//!
//! Verifies gateway callbacks and applies them to payment and booking
//! state in one transaction.
//!
//! ## handleCallback
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TransactionCallback + provided hmac                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  verify signature ── mismatch ──► SignatureMismatch (401)              │
//! │       │                └── soft-fail flag on: warn and continue        │
//! │       ▼                                                                 │
//! │  merchant_order_id = booking id ── missing ──► InvalidInput            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  pending at gateway? ── yes ──► Ignored (final callback follows)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  payments().reconcile(booking_id, order) ── none ──► NotFound          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Applied | Replayed   (both acknowledged with 200 OK)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{info, warn};

use crate::callback::TransactionCallback;
use crate::error::{BookingError, BookingResult};
use crate::signature::CallbackSigner;
use haven_core::{BookingStatus, NotificationKind, PaymentStatus};
use haven_db::{Database, ReconcileOutcome};

/// What handling a callback did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WebhookOutcome {
    /// State advanced and a notification was written.
    Applied {
        booking_id: String,
        payment_status: PaymentStatus,
        booking_status: BookingStatus,
        notification: NotificationKind,
    },
    /// Redelivery; nothing changed.
    Replayed {
        booking_id: String,
        payment_status: PaymentStatus,
    },
    /// Non-final transaction; nothing changed.
    Ignored { booking_id: String },
}

/// Applies verified gateway callbacks.
#[derive(Debug, Clone)]
pub struct WebhookReconciler {
    db: Database,
    signer: CallbackSigner,
    soft_fail: bool,
}

impl WebhookReconciler {
    /// `soft_fail` processes callbacks whose signature does not verify.
    /// Only for debugging against a sandbox.
    pub fn new(db: Database, signer: CallbackSigner, soft_fail: bool) -> Self {
        if soft_fail {
            warn!("Webhook signature verification is in soft-fail mode");
        }
        WebhookReconciler {
            db,
            signer,
            soft_fail,
        }
    }

    pub async fn handle_callback(
        &self,
        callback: &TransactionCallback,
        signature: Option<&str>,
    ) -> BookingResult<WebhookOutcome> {
        let verified = signature
            .map(|sig| self.signer.verify(callback, sig))
            .unwrap_or(false);

        if !verified {
            warn!(
                transaction_id = %callback.transaction_id(),
                signature_present = signature.is_some(),
                soft_fail = self.soft_fail,
                "Callback signature mismatch"
            );
            if !self.soft_fail {
                return Err(BookingError::SignatureMismatch);
            }
        }

        let booking_id = callback
            .merchant_order_id()
            .ok_or_else(|| BookingError::InvalidInput("merchant_order_id is required".to_string()))?;

        if callback.pending() && !callback.success() {
            info!(booking_id = %booking_id, "Non-final transaction ignored");
            return Ok(WebhookOutcome::Ignored { booking_id });
        }

        let order_id = callback.order_id();
        let outcome = self
            .db
            .payments()
            .reconcile(&booking_id, order_id.as_deref(), callback.success(), &callback.raw())
            .await?;

        Ok(match outcome {
            ReconcileOutcome::Replayed { payment } => {
                info!(booking_id = %booking_id, status = %payment, "Duplicate callback acknowledged");
                WebhookOutcome::Replayed {
                    booking_id,
                    payment_status: payment,
                }
            }
            ReconcileOutcome::Applied {
                payment,
                booking,
                notification,
            } => WebhookOutcome::Applied {
                booking_id,
                payment_status: payment,
                booking_status: booking,
                notification,
            },
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InMemoryGateway;
    use crate::session::PaymentSessionManager;
    use crate::testing;
    use serde_json::json;
    use std::sync::Arc;

    fn callback(booking_id: &str, success: bool, pending: bool) -> TransactionCallback {
        callback_for_order(booking_id, 1001, success, pending)
    }

    fn callback_for_order(booking_id: &str, order_id: u64, success: bool, pending: bool) -> TransactionCallback {
        let body = json!({
            "type": "TRANSACTION",
            "obj": {
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
                "order": { "id": order_id, "merchant_order_id": booking_id },
                "owner": 77,
                "pending": pending,
                "source_data": { "pan": "2346", "sub_type": "MasterCard", "type": "card" },
                "success": success
            }
        });
        TransactionCallback::from_json(body.to_string().as_bytes()).unwrap()
    }

    async fn setup(soft_fail: bool) -> (Database, WebhookReconciler, CallbackSigner, String) {
        let (db, room) = testing::db_with_room(26_000).await;
        let booking = testing::pending_booking(&db, &room, "u1", "2024-03-01", "2024-03-04").await;
        testing::session(&db, &booking).await;
        let signer = CallbackSigner::new("whsec").unwrap();
        let reconciler = WebhookReconciler::new(db.clone(), signer.clone(), soft_fail);
        (db, reconciler, signer, booking.id)
    }

    #[tokio::test]
    async fn test_success_delivered_three_times_applies_once() {
        let (db, reconciler, signer, booking_id) = setup(false).await;
        let cb = callback(&booking_id, true, false);
        let sig = signer.sign(&cb);

        let first = reconciler.handle_callback(&cb, Some(&sig)).await.unwrap();
        assert!(matches!(
            first,
            WebhookOutcome::Applied {
                payment_status: PaymentStatus::Paid,
                booking_status: BookingStatus::Confirmed,
                notification: NotificationKind::BookingConfirmed,
                ..
            }
        ));
        for _ in 0..2 {
            let again = reconciler.handle_callback(&cb, Some(&sig)).await.unwrap();
            assert!(matches!(again, WebhookOutcome::Replayed { .. }));
        }

        let booking = db.bookings().get_by_id(&booking_id).await.unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(db.notifications().list_for_user("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_booking_pending() {
        let (db, reconciler, signer, booking_id) = setup(false).await;
        let cb = callback(&booking_id, false, false);

        let outcome = reconciler.handle_callback(&cb, Some(&signer.sign(&cb))).await.unwrap();
        assert!(matches!(
            outcome,
            WebhookOutcome::Applied {
                payment_status: PaymentStatus::Failed,
                booking_status: BookingStatus::Pending,
                notification: NotificationKind::PaymentFailed,
                ..
            }
        ));
        let payment = db.payments().get_by_booking(&booking_id).await.unwrap().unwrap();
        assert_eq!(payment.status, PaymentStatus::Failed);
        assert!(payment.raw_payload.unwrap_or_default().contains("5001"));
    }

    #[tokio::test]
    async fn test_tampered_callback_is_rejected() {
        let (db, reconciler, signer, booking_id) = setup(false).await;
        let declined = callback(&booking_id, false, false);
        let sig = signer.sign(&declined);

        let tampered = callback(&booking_id, true, false);
        assert!(matches!(
            reconciler.handle_callback(&tampered, Some(&sig)).await,
            Err(BookingError::SignatureMismatch)
        ));
        assert!(matches!(
            reconciler.handle_callback(&tampered, None).await,
            Err(BookingError::SignatureMismatch)
        ));

        let payment = db.payments().get_by_booking(&booking_id).await.unwrap().unwrap();
        assert_eq!(payment.status, PaymentStatus::Initiated);
    }

    #[tokio::test]
    async fn test_soft_fail_processes_unverified_callback() {
        let (_db, reconciler, _signer, booking_id) = setup(true).await;
        let cb = callback(&booking_id, true, false);

        let outcome = reconciler.handle_callback(&cb, Some("deadbeef")).await.unwrap();
        assert!(matches!(outcome, WebhookOutcome::Applied { .. }));
    }

    #[tokio::test]
    async fn test_unknown_booking_and_pending_transaction() {
        let (_db, reconciler, signer, booking_id) = setup(false).await;

        let unknown = callback("no-such-booking", true, false);
        assert!(matches!(
            reconciler.handle_callback(&unknown, Some(&signer.sign(&unknown))).await,
            Err(BookingError::NotFound { .. })
        ));

        let pending = callback(&booking_id, false, true);
        let outcome = reconciler
            .handle_callback(&pending, Some(&signer.sign(&pending)))
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::Ignored { booking_id });
    }

    #[tokio::test]
    async fn test_redelivered_decline_keeps_retry_session() {
        let (db, room) = testing::db_with_room(26_000).await;
        let booking = testing::pending_booking(&db, &room, "u1", "2024-03-01", "2024-03-04").await;
        let gateway = InMemoryGateway::new();
        let sessions = PaymentSessionManager::new(db.clone(), Arc::new(gateway.clone()));
        let signer = CallbackSigner::new("whsec").unwrap();
        let reconciler = WebhookReconciler::new(db.clone(), signer.clone(), false);

        sessions.initiate_payment("u1", &booking.id).await.unwrap();
        let declined = callback_for_order(&booking.id, 1001, false, false);
        let sig = signer.sign(&declined);
        reconciler.handle_callback(&declined, Some(&sig)).await.unwrap();

        let retry = sessions.initiate_payment("u1", &booking.id).await.unwrap();
        assert_eq!(gateway.order_count().await, 2);

        let outcome = reconciler.handle_callback(&declined, Some(&sig)).await.unwrap();
        assert_eq!(
            outcome,
            WebhookOutcome::Replayed {
                booking_id: booking.id.clone(),
                payment_status: PaymentStatus::Initiated,
            }
        );

        // The second order is still the one the guest pays
        let again = sessions.initiate_payment("u1", &booking.id).await.unwrap();
        assert_eq!(again, retry);
        assert_eq!(gateway.order_count().await, 2);
        assert_eq!(db.notifications().list_for_user("u1").await.unwrap().len(), 1);

        let paid = callback_for_order(&booking.id, 1002, true, false);
        let outcome = reconciler.handle_callback(&paid, Some(&signer.sign(&paid))).await.unwrap();
        assert!(matches!(
            outcome,
            WebhookOutcome::Applied { booking_status: BookingStatus::Confirmed, .. }
        ));
    }
}
