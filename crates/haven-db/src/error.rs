//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │   RAISE(ABORT, 'booking_overlap') from the overlap triggers    │
//! │       │   UNIQUE constraint failed: payments.booking_id                │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Classified by message                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BookingError (haven-booking) ← OverlapConflict → RoomUnavailable      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (haven-api) ← JSON { code, message }                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Message raised by the overlap triggers.
pub const OVERLAP_ABORT: &str = "booking_overlap";

/// Messages raised by the terminal-state triggers.
const TERMINAL_ABORTS: [&str; 2] = ["booking_terminal", "payment_paid_immutable"];

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A confirmed booking on the same room overlaps the stay.
    ///
    /// ## When This Occurs
    /// - Inserting a booking whose dates collide with a confirmed one
    /// - Confirming a booking while another confirmed booking took the dates
    #[error("Room {room_id} already has a confirmed booking for these dates")]
    OverlapConflict { room_id: String },

    /// A trigger refused to leave a terminal state.
    ///
    /// ## When This Occurs
    /// - Changing the status of a confirmed or cancelled booking
    /// - Rewriting a payment that is already paid
    #[error("Record is in a terminal state: {0}")]
    TerminalState(String),

    /// Unique constraint violation.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Attaches the room id to an overlap error raised without context.
    pub(crate) fn with_room(self, room: &str) -> Self {
        match self {
            DbError::OverlapConflict { .. } => DbError::OverlapConflict {
                room_id: room.to_string(),
            },
            other => other,
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → trigger message or constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if msg.contains(OVERLAP_ABORT) {
                    DbError::OverlapConflict {
                        room_id: "unknown".to_string(),
                    }
                } else if let Some(abort) = TERMINAL_ABORTS.iter().find(|a| msg.contains(*a)) {
                    DbError::TerminalState(abort.to_string())
                } else if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
