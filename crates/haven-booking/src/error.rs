//! # Booking Error Types
//!
//! The error taxonomy every booking and payment operation reports.
//!
//! ## Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CoreError::Validation            → InvalidInput                       │
//! │  CoreError::InvalidDateRange      → InvalidDateRange                   │
//! │  CoreError::InvalidTransition     → InvalidState                       │
//! │  DbError::OverlapConflict         → RoomUnavailable                    │
//! │  DbError::TerminalState           → InvalidState                       │
//! │  DbError::NotFound                → NotFound                           │
//! │  GatewayError                     → Provider                           │
//! │  anything else from the store     → Storage                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::gateway::GatewayError;
use haven_core::CoreError;
use haven_db::DbError;

/// Result type alias for service operations.
pub type BookingResult<T> = Result<T, BookingError>;

/// Failures of booking, payment session and webhook operations.
///
/// None of these crash the process; each maps to a structured HTTP error.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Missing or malformed field. Client-caused, never retried.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Zero-night, inverted or too-long stay.
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Room not found: {0}")]
    RoomNotFound(String),

    /// A confirmed booking already holds part of the stay.
    #[error("Room {room_id} is not available for the requested dates")]
    RoomUnavailable { room_id: String },

    /// Missing, or owned by someone else. The two are indistinguishable.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Operation not valid for the current booking or payment status.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The booking's payment already went through.
    #[error("Booking {0} is already paid")]
    AlreadyPaid(String),

    /// Upstream gateway failure. Retrying the whole call is safe.
    #[error("Payment provider error: {0}")]
    Provider(#[from] GatewayError),

    /// Callback signature missing or wrong.
    #[error("Callback signature mismatch")]
    SignatureMismatch,

    /// Unexpected storage failure.
    #[error("Storage error: {0}")]
    Storage(DbError),
}

impl BookingError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        BookingError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<CoreError> for BookingError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidDateRange { .. } => {
                BookingError::InvalidDateRange(err.to_string())
            }
            CoreError::AmountOverflow { .. } | CoreError::Validation(_) => {
                BookingError::InvalidInput(err.to_string())
            }
            CoreError::InvalidTransition { .. } => BookingError::InvalidState(err.to_string()),
        }
    }
}

impl From<DbError> for BookingError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::OverlapConflict { room_id } => BookingError::RoomUnavailable { room_id },
            DbError::TerminalState(reason) => BookingError::InvalidState(reason),
            DbError::NotFound { entity, id } => BookingError::NotFound {
                entity: match entity.as_str() {
                    "Booking" => "Booking",
                    "Payment" => "Payment",
                    _ => "Record",
                },
                id,
            },
            other => BookingError::Storage(other),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
