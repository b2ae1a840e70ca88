//! # Booking Repository
//!
//! Database operations for bookings.
//!
//! ## Booking Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Booking Lifecycle                                 │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── insert_if_available() → Booking { status: Pending }            │
//! │         (overlap trigger aborts the INSERT on a confirmed collision)   │
//! │                                                                         │
//! │  2a. CONFIRM (payment repository, inside reconciliation)               │
//! │     └── status: Pending → Confirmed                                    │
//! │                                                                         │
//! │  2b. CANCEL (owner only)                                               │
//! │     └── cancel() → status: Pending → Cancelled                         │
//! │                                                                         │
//! │  Confirmed and Cancelled are terminal (trigger-enforced).              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use haven_core::{Booking, BookingStatus, BookingSummary};

/// Repository for booking database operations.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: SqlitePool,
}

impl BookingRepository {
    /// Creates a new BookingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookingRepository { pool }
    }

    /// Inserts a pending booking unless a confirmed booking already holds
    /// an overlapping stay on the same room.
    ///
    /// The check and the insert are one statement: the overlap trigger runs
    /// inside the INSERT, so no interleaving can slip between them.
    ///
    /// ## Returns
    /// * `Ok(())` - Booking stored
    /// * `Err(DbError::OverlapConflict)` - Dates taken
    /// * `Err(DbError::ForeignKeyViolation)` - Room does not exist
    pub async fn insert_if_available(&self, booking: &Booking) -> DbResult<()> {
        debug!(
            id = %booking.id,
            room_id = %booking.room_id,
            check_in = %booking.check_in,
            check_out = %booking.check_out,
            "Inserting booking"
        );

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, user_id, room_id, check_in, check_out,
                nights, total_amount_cents, currency, status,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&booking.id)
        .bind(&booking.user_id)
        .bind(&booking.room_id)
        .bind(booking.check_in)
        .bind(booking.check_out)
        .bind(booking.nights)
        .bind(booking.total_amount_cents)
        .bind(&booking.currency)
        .bind(booking.status)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_room(&booking.room_id))?;

        Ok(())
    }

    /// Gets a booking by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Booking>> {
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
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    /// Lists a user's bookings with room and hotel names, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<BookingSummary>> {
        let bookings = sqlx::query_as::<_, BookingSummary>(
            r#"
            SELECT
                b.id, b.user_id, b.room_id, b.check_in, b.check_out,
                b.nights, b.total_amount_cents, b.currency, b.status,
                b.created_at, b.updated_at,
                r.name AS room_name,
                h.name AS hotel_name
            FROM bookings b
            JOIN rooms r ON r.id = b.room_id
            JOIN hotels h ON h.id = r.hotel_id
            WHERE b.user_id = ?1
            ORDER BY b.created_at DESC, b.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    /// Cancels a pending booking owned by `user_id`.
    ///
    /// ## Returns
    /// * `Ok(Some(booking))` - Now cancelled
    /// * `Ok(None)` - No pending booking with that id for that user
    pub async fn cancel(&self, id: &str, user_id: &str) -> DbResult<Option<Booking>> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                status = ?3,
                updated_at = ?4
            WHERE id = ?1 AND user_id = ?2 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(BookingStatus::Cancelled)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!(id = %id, "Booking not cancellable");
            return Ok(None);
        }

        debug!(id = %id, "Booking cancelled");
        self.get_by_id(id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = fixtures::db().await;
        let room = fixtures::room(&db, 26_000, 2).await;
        let booking = fixtures::booking(&room, "u1", "2024-03-01", "2024-03-04");

        db.bookings().insert_if_available(&booking).await.unwrap();

        let stored = db.bookings().get_by_id(&booking.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Pending);
        assert_eq!(stored.nights, 3);
        assert_eq!(stored.total_amount_cents, 78_000);
        assert_eq!(stored.check_in, fixtures::date("2024-03-01"));
    }

    #[tokio::test]
    async fn test_pending_bookings_do_not_block_each_other() {
        let db = fixtures::db().await;
        let room = fixtures::room(&db, 10_000, 2).await;

        let a = fixtures::booking(&room, "u1", "2024-03-01", "2024-03-04");
        let b = fixtures::booking(&room, "u2", "2024-03-02", "2024-03-05");
        db.bookings().insert_if_available(&a).await.unwrap();
        db.bookings().insert_if_available(&b).await.unwrap();
    }

    #[tokio::test]
    async fn test_confirmed_booking_blocks_overlap() {
        let db = fixtures::db().await;
        let room = fixtures::room(&db, 10_000, 2).await;

        let a = fixtures::booking(&room, "u1", "2024-03-01", "2024-03-04");
        db.bookings().insert_if_available(&a).await.unwrap();
        fixtures::confirm(&db, &a.id).await;

        let b = fixtures::booking(&room, "u2", "2024-03-03", "2024-03-05");
        let err = db.bookings().insert_if_available(&b).await.unwrap_err();
        assert!(matches!(err, DbError::OverlapConflict { ref room_id } if *room_id == room.id));

        // Touching check-out/check-in is not an overlap
        let c = fixtures::booking(&room, "u2", "2024-03-04", "2024-03-06");
        db.bookings().insert_if_available(&c).await.unwrap();
    }

    #[tokio::test]
    async fn test_confirmed_booking_update_skips_itself() {
        let db = fixtures::db().await;
        let room = fixtures::room(&db, 10_000, 2).await;

        let a = fixtures::booking(&room, "u1", "2024-03-01", "2024-03-04");
        let b = fixtures::booking(&room, "u2", "2024-03-06", "2024-03-08");
        for booking in [&a, &b] {
            db.bookings().insert_if_available(booking).await.unwrap();
            fixtures::confirm(&db, &booking.id).await;
        }

        let set_check_out = "UPDATE bookings SET check_out = ?2 WHERE id = ?1";

        // Still overlaps its own old dates
        sqlx::query(set_check_out)
            .bind(&a.id)
            .bind(fixtures::date("2024-03-05"))
            .execute(db.pool())
            .await
            .unwrap();
        let stored = db.bookings().get_by_id(&a.id).await.unwrap().unwrap();
        assert_eq!(stored.check_out, fixtures::date("2024-03-05"));

        let err = sqlx::query(set_check_out)
            .bind(&a.id)
            .bind(fixtures::date("2024-03-07"))
            .execute(db.pool())
            .await
            .map_err(DbError::from)
            .unwrap_err();
        assert!(matches!(err, DbError::OverlapConflict { .. }));
    }

    #[tokio::test]
    async fn test_unknown_room_is_foreign_key_violation() {
        let db = fixtures::db().await;
        let room = fixtures::room(&db, 10_000, 2).await;
        let mut booking = fixtures::booking(&room, "u1", "2024-03-01", "2024-03-04");
        booking.room_id = "missing".to_string();

        let err = db.bookings().insert_if_available(&booking).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_for_user_newest_first() {
        let db = fixtures::db().await;
        let room = fixtures::room(&db, 10_000, 2).await;

        let mut older = fixtures::booking(&room, "u1", "2024-03-01", "2024-03-02");
        older.created_at = older.created_at - chrono::Duration::minutes(5);
        let newer = fixtures::booking(&room, "u1", "2024-04-01", "2024-04-02");
        let other = fixtures::booking(&room, "u2", "2024-05-01", "2024-05-02");
        for b in [&older, &newer, &other] {
            db.bookings().insert_if_available(b).await.unwrap();
        }

        let listed = db.bookings().list_for_user("u1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].booking.id, newer.id);
        assert_eq!(listed[1].booking.id, older.id);
        assert_eq!(listed[0].room_name, "Deluxe King");
        assert_eq!(listed[0].hotel_name, "Nile View");
    }

    #[tokio::test]
    async fn test_cancel_rules() {
        let db = fixtures::db().await;
        let room = fixtures::room(&db, 10_000, 2).await;
        let booking = fixtures::booking(&room, "u1", "2024-03-01", "2024-03-04");
        db.bookings().insert_if_available(&booking).await.unwrap();

        // Not the owner
        assert!(db.bookings().cancel(&booking.id, "u2").await.unwrap().is_none());

        let cancelled = db.bookings().cancel(&booking.id, "u1").await.unwrap().unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);

        // Already cancelled
        assert!(db.bookings().cancel(&booking.id, "u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_terminal_status_is_enforced() {
        let db = fixtures::db().await;
        let room = fixtures::room(&db, 10_000, 2).await;
        let booking = fixtures::booking(&room, "u1", "2024-03-01", "2024-03-04");
        db.bookings().insert_if_available(&booking).await.unwrap();
        fixtures::confirm(&db, &booking.id).await;

        let err = sqlx::query("UPDATE bookings SET status = 'cancelled' WHERE id = ?1")
            .bind(&booking.id)
            .execute(db.pool())
            .await
            .map_err(DbError::from)
            .unwrap_err();
        assert!(matches!(err, DbError::TerminalState(_)));
    }
}
