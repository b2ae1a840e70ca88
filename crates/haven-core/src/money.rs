//! # Money Module
//!
//! Provides the `Money` type for room prices, booking totals and gateway
//! amounts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ONE UNIT EVERYWHERE                                                    │
//! │                                                                         │
//! │  rooms.price_per_night_cents ──► bookings.total_amount_cents            │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                          gateway amount_cents (minor units)             │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                          callback amount_cents (signed field)           │
//! │                                                                         │
//! │  The gateway already speaks cents, so no conversion ever happens       │
//! │  between what we price and what we charge.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use haven_core::money::Money;
//!
//! let nightly = Money::from_cents(26_000); // 260.00
//! let total = nightly.checked_times(3).unwrap();
//! assert_eq!(total.cents(), 78_000);
//! assert_eq!(total.to_string(), "780.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents, piastres, ...).
///
/// Currency is carried next to the amount on every record, not inside
/// `Money`, matching the storage layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use haven_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Multiplies by a count (nights), returning `None` on overflow.
    ///
    /// ## User Workflow
    /// ```text
    /// Room: 260.00 / night
    /// Stay: 2024-03-01 → 2024-03-04 (3 nights)
    ///      │
    ///      ▼
    /// checked_times(3) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Booking total: 780.00
    /// ```
    #[inline]
    pub const fn checked_times(&self, count: i64) -> Option<Self> {
        match self.0.checked_mul(count) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows `major.minor` without a currency symbol; callers append the code.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(78_000).to_string(), "780.00");
        assert_eq!(Money::from_cents(505).to_string(), "5.05");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
    }

    #[test]
    fn test_nightly_total() {
        let nightly = Money::from_cents(26_000);
        assert_eq!(nightly.checked_times(3), Some(Money::from_cents(78_000)));
    }

    #[test]
    fn test_checked_times_overflow() {
        let huge = Money::from_cents(i64::MAX / 2);
        assert_eq!(huge.checked_times(3), None);
    }
}
