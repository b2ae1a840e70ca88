//! # Error Types
//!
//! Domain-specific error types for haven-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  haven-core errors (this file)                                         │
//! │  ├── CoreError        - Date range and status rule violations          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  haven-db errors                                                       │
//! │  └── DbError          - Storage failures, constraint/trigger aborts    │
//! │                                                                         │
//! │  haven-booking errors                                                  │
//! │  └── BookingError     - The caller-facing taxonomy                     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → BookingError → ApiError → client  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business rule errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Check-out is not after check-in.
    ///
    /// ## When This Occurs
    /// - Same check-in and check-out (zero nights)
    /// - Dates supplied in the wrong order
    #[error("Invalid date range: check-out {check_out} must be after check-in {check_in}")]
    InvalidDateRange {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    /// Price computation left the representable range.
    #[error("Amount overflow computing {nights} nights at {price_cents} per night")]
    AmountOverflow { nights: i64, price_cents: i64 },

    /// Status change not allowed by the lifecycle.
    #[error("Cannot move {entity} from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any business logic runs; always caused by the client.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidDateRange {
            check_in: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid date range: check-out 2024-03-01 must be after check-in 2024-03-04"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "room_id".to_string(),
        };
        assert_eq!(err.to_string(), "room_id is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "check_in".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
