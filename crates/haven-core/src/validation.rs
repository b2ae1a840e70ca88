//! # Validation Module
//!
//! Input validation for booking requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (haven-api)                                     │
//! │  └── JSON deserialization, all fields optional on the wire             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── presence of room_id / check_in / check_out  → InvalidInput        │
//! │  └── date parsing, nights >= 1, nights <= max    → InvalidDateRange    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (check_out > check_in), CHECK (nights > 0)                  │
//! │  ├── UNIQUE payments.booking_id                                        │
//! │  └── overlap triggers on bookings                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::dates::DateRange;
use crate::error::{CoreResult, ValidationError};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest identifier accepted from clients.
const MAX_ID_LEN: usize = 64;

/// Validates that an optional field is present and non-blank, returning it trimmed.
///
/// ## Example
/// ```rust
/// use haven_core::validation::require;
///
/// assert_eq!(require("room_id", Some(" r-1 ")).unwrap(), "r-1");
/// assert!(require("room_id", Some("  ")).is_err());
/// assert!(require("room_id", None).is_err());
/// ```
pub fn require<'a>(field: &str, value: Option<&'a str>) -> ValidationResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::Required {
            field: field.to_string(),
        }),
    }
}

/// Validates an entity identifier supplied by a client.
pub fn validate_id(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > MAX_ID_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ID_LEN,
        });
    }

    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a minimum-capacity filter.
pub fn validate_capacity(min_capacity: i64) -> ValidationResult<()> {
    if min_capacity < 1 {
        return Err(ValidationError::MustBePositive {
            field: "min_capacity".to_string(),
        });
    }
    Ok(())
}

/// A create-booking request after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBookingRequest {
    pub room_id: String,
    pub stay: DateRange,
}

/// Validates the raw create-booking fields.
///
/// Presence is checked for every field first so a request missing several
/// fields reports a missing field rather than a date error.
pub fn validate_booking_request(
    room_id: Option<&str>,
    check_in: Option<&str>,
    check_out: Option<&str>,
) -> CoreResult<ValidBookingRequest> {
    let room_id = require("room_id", room_id)?;
    let check_in = require("check_in", check_in)?;
    let check_out = require("check_out", check_out)?;
    validate_id("room_id", room_id)?;

    let stay = DateRange::parse(check_in, check_out)?;

    Ok(ValidBookingRequest {
        room_id: room_id.to_string(),
        stay,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
