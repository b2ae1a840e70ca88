//! # Payment Repository
//!
//! Payment sessions and gateway callback reconciliation.
//!
//! ## Reconciliation Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  reconcile(booking_id, order_id, success, payload)                     │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │   ├── touch payment row        ← takes the write lock before reading   │
//! │   ├── SELECT payment           ← none: NotFound                        │
//! │   ├── failure for a replaced order ← Replay: COMMIT, nothing changed   │
//! │   ├── status.on_callback()     ← Replay: COMMIT, nothing changed       │
//! │   ├── UPDATE payment status + raw payload                              │
//! │   ├── UPDATE booking → confirmed (success only)                        │
//! │   │     overlap trigger / not pending → booking_conflict               │
//! │   └── INSERT notification                                              │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  Either every write lands or none does.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::notification::insert_notification;
use haven_core::{
    Booking, BookingStatus, CallbackTransition, Notification, NotificationKind, Payment,
    PaymentStatus,
};

/// A freshly created gateway session to store against a booking.
#[derive(Debug, Clone)]
pub struct NewPaymentSession {
    pub booking_id: String,
    pub provider: String,
    pub provider_order_id: String,
    pub session_token: String,
    pub amount_cents: i64,
    pub currency: String,
    pub raw_payload: Option<String>,
}

/// What a reconciled callback did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Redelivery of an already-applied outcome. Nothing was written.
    Replayed { payment: PaymentStatus },
    /// Payment, booking and notification were written together.
    Applied {
        payment: PaymentStatus,
        booking: BookingStatus,
        notification: NotificationKind,
    },
}

/// Repository for payment database operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Gets the payment attached to a booking, if any.
    pub async fn get_by_booking(&self, booking_id: &str) -> DbResult<Option<Payment>> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_booking(&mut *conn, booking_id).await
    }

    /// Stores a session keyed by booking id, resetting status to `initiated`.
    ///
    /// The unique booking reference makes concurrent callers converge on one
    /// row. A `paid` row is never overwritten.
    ///
    /// ## Returns
    /// * `Ok(payment)` - The stored row
    /// * `Err(DbError::TerminalState)` - The booking is already paid
    pub async fn upsert_session(&self, session: &NewPaymentSession) -> DbResult<Payment> {
        let now = Utc::now();
        debug!(
            booking_id = %session.booking_id,
            provider_order_id = %session.provider_order_id,
            "Upserting payment session"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO payments (
                id, booking_id, provider, provider_order_id, session_token,
                amount_cents, currency, status, raw_payload,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
            ON CONFLICT(booking_id) DO UPDATE SET
                provider = excluded.provider,
                provider_order_id = excluded.provider_order_id,
                session_token = excluded.session_token,
                amount_cents = excluded.amount_cents,
                currency = excluded.currency,
                status = excluded.status,
                raw_payload = excluded.raw_payload,
                updated_at = excluded.updated_at
            WHERE payments.status <> 'paid'
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&session.booking_id)
        .bind(&session.provider)
        .bind(&session.provider_order_id)
        .bind(&session.session_token)
        .bind(session.amount_cents)
        .bind(&session.currency)
        .bind(PaymentStatus::Initiated)
        .bind(&session.raw_payload)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::TerminalState("payment_paid_immutable".to_string()));
        }

        self.get_by_booking(&session.booking_id)
            .await?
            .ok_or_else(|| DbError::not_found("Payment", &session.booking_id))
    }

    /// Applies a verified gateway outcome to the payment of `booking_id`.
    ///
    /// Safe under redelivery: the transition table in
    /// [`PaymentStatus::on_callback`] turns repeats into
    /// [`ReconcileOutcome::Replayed`].
    ///
    /// `provider_order_id` is the gateway order the callback belongs to. A
    /// failure for an order other than the stored one is stale and changes
    /// nothing; a success for it is still applied since the money moved.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No payment exists for the booking
    pub async fn reconcile(
        &self,
        booking_id: &str,
        provider_order_id: Option<&str>,
        success: bool,
        raw_payload: &str,
    ) -> DbResult<ReconcileOutcome> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        // A write first so the transaction holds the lock for its reads.
        let touched = sqlx::query("UPDATE payments SET updated_at = updated_at WHERE booking_id = ?1")
            .bind(booking_id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            return Err(DbError::not_found("Payment", booking_id));
        }

        let payment = fetch_by_booking(&mut *tx, booking_id)
            .await?
            .ok_or_else(|| DbError::not_found("Payment", booking_id))?;

        let replaced_order = match (provider_order_id, payment.provider_order_id.as_deref()) {
            (Some(received), Some(stored)) => received != stored,
            _ => false,
        };
        if replaced_order && !success && payment.status != PaymentStatus::Paid {
            debug!(
                booking_id = %booking_id,
                received = ?provider_order_id,
                stored = ?payment.provider_order_id,
                "Failure for a replaced order ignored"
            );
            tx.commit().await?;
            return Ok(ReconcileOutcome::Replayed {
                payment: payment.status,
            });
        }

        let (new_status, confirm_booking, mut kind) = match payment.status.on_callback(success) {
            CallbackTransition::Replay => {
                debug!(booking_id = %booking_id, status = %payment.status, "Callback replay ignored");
                tx.commit().await?;
                return Ok(ReconcileOutcome::Replayed {
                    payment: payment.status,
                });
            }
            CallbackTransition::Apply {
                payment,
                confirm_booking,
                notification,
            } => (payment, confirm_booking, notification),
        };

        sqlx::query(
            r#"
            UPDATE payments SET
                status = ?2,
                raw_payload = ?3,
                updated_at = ?4
            WHERE booking_id = ?1
            "#,
        )
        .bind(booking_id)
        .bind(new_status)
        .bind(raw_payload)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            SELECT
                id, user_id, room_id, check_in, check_out,
                nights, total_amount_cents, currency, status,
                created_at, updated_at
            FROM bookings
            WHERE id = ?1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Booking", booking_id))?;

        let mut booking_status = booking.status;
        if confirm_booking {
            match booking.status {
                BookingStatus::Pending => {
                    let confirmed = sqlx::query(
                        "UPDATE bookings SET status = ?2, updated_at = ?3 WHERE id = ?1",
                    )
                    .bind(booking_id)
                    .bind(BookingStatus::Confirmed)
                    .bind(now)
                    .execute(&mut *tx)
                    .await
                    .map_err(DbError::from);

                    match confirmed {
                        Ok(_) => booking_status = BookingStatus::Confirmed,
                        // ABORT only undoes the failed statement; the transaction stays usable.
                        Err(DbError::OverlapConflict { .. }) => {
                            error!(
                                booking_id = %booking_id,
                                room_id = %booking.room_id,
                                "Payment captured but dates were taken by another confirmed booking; refund required"
                            );
                            kind = NotificationKind::BookingConflict;
                        }
                        Err(e) => return Err(e),
                    }
                }
                BookingStatus::Confirmed => {}
                BookingStatus::Cancelled => {
                    error!(
                        booking_id = %booking_id,
                        "Payment captured for a cancelled booking; refund required"
                    );
                    kind = NotificationKind::BookingConflict;
                }
            }
        }

        let (title, body) = kind.render(booking_id);
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            user_id: booking.user_id.clone(),
            kind,
            title,
            body,
            is_read: false,
            created_at: now,
        };
        insert_notification(&mut *tx, &notification).await?;

        tx.commit().await?;

        info!(
            booking_id = %booking_id,
            payment = %new_status,
            booking = %booking_status,
            "Payment callback applied"
        );

        Ok(ReconcileOutcome::Applied {
            payment: new_status,
            booking: booking_status,
            notification: kind,
        })
    }
}

async fn fetch_by_booking(
    conn: &mut SqliteConnection,
    booking_id: &str,
) -> DbResult<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(
        r#"
        SELECT
            id, booking_id, provider, provider_order_id, session_token,
            amount_cents, currency, status, raw_payload,
            created_at, updated_at
        FROM payments
        WHERE booking_id = ?1
        "#,
    )
    .bind(booking_id)
    .fetch_optional(conn)
    .await?;

    Ok(payment)
}

// =============================================================================
// Unit Tests
// =============================================================================
