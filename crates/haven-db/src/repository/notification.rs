//! # Notification Repository
//!
//! In-app notifications written by payment reconciliation.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use haven_core::Notification;

/// Repository for notification database operations.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    /// Creates a new NotificationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        NotificationRepository { pool }
    }

    /// Lists a user's notifications, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, kind, title, body, is_read, created_at
            FROM notifications
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    /// Marks a notification read. Returns false when the user owns no such notification.
    pub async fn mark_read(&self, id: &str, user_id: &str) -> DbResult<bool> {
        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Inserts a notification on an existing connection or transaction.
pub(crate) async fn insert_notification(
    conn: &mut SqliteConnection,
    notification: &Notification,
) -> DbResult<()> {
    debug!(
        id = %notification.id,
        user_id = %notification.user_id,
        kind = ?notification.kind,
        "Inserting notification"
    );

    sqlx::query(
        r#"
        INSERT INTO notifications (id, user_id, kind, title, body, is_read, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&notification.id)
    .bind(&notification.user_id)
    .bind(notification.kind)
    .bind(&notification.title)
    .bind(&notification.body)
    .bind(notification.is_read)
    .bind(notification.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
