//! # Stay Date Ranges
//!
//! A stay is the half-open interval `[check_in, check_out)`: the guest
//! sleeps the nights starting on `check_in` up to, but not including,
//! `check_out`.
//!
//! ## Overlap Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  a.check_in < b.check_out  AND  a.check_out > b.check_in               │
//! │                                                                         │
//! │  Mar 01 ───────── Mar 04                                               │
//! │            Mar 02 ───────── Mar 05     overlap (shares 2 nights)       │
//! │                                                                         │
//! │  Mar 01 ───────── Mar 04                                               │
//! │                   Mar 04 ───── Mar 06  NO overlap (touching endpoint)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The same predicate is enforced by the storage triggers in haven-db.
//!
//! ## Nights
//! `nights = ceil((check_out - check_in) in days)`. Timestamp input is
//! measured exactly, then the stay is anchored on the check-in date:
//!
//! ```text
//!   2024-03-01T00:00Z → 2024-03-01T12:00Z   0.5 days → 1 night, 03-01..03-02
//!   2024-03-01T14:00Z → 2024-03-04T11:00Z   2.9 days → 3 nights, 03-01..03-04
//! ```

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};

/// A validated stay: `check_out` is strictly after `check_in`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "String")]
    check_in: NaiveDate,
    #[ts(as = "String")]
    check_out: NaiveDate,
}

impl DateRange {
    /// Builds a range, rejecting zero-night and reversed ranges.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use haven_core::dates::DateRange;
    ///
    /// let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
    /// assert!(DateRange::new(day(1), day(4)).is_ok());
    /// assert!(DateRange::new(day(4), day(4)).is_err());
    /// ```
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> CoreResult<Self> {
        if check_out <= check_in {
            return Err(CoreError::InvalidDateRange {
                check_in,
                check_out,
            });
        }
        Ok(DateRange {
            check_in,
            check_out,
        })
    }

    /// Parses both ends and builds the range.
    ///
    /// Accepts `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp. Partial
    /// days round up to a whole night.
    pub fn parse(check_in: &str, check_out: &str) -> CoreResult<Self> {
        let start = parse_stay_instant("check_in", check_in)?;
        let end = parse_stay_instant("check_out", check_out)?;

        let check_in = start.date_naive();
        let invalid = || CoreError::InvalidDateRange {
            check_in,
            check_out: end.date_naive(),
        };
        let check_out = ceil_days(end - start)
            .and_then(|nights| check_in.checked_add_days(Days::new(nights)))
            .ok_or_else(invalid)?;

        DateRange::new(check_in, check_out)
    }

    #[inline]
    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    #[inline]
    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Number of nights in the stay (always >= 1).
    #[inline]
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Half-open overlap test; touching endpoints do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.check_in < other.check_out && self.check_out > other.check_in
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.check_in, self.check_out)
    }
}

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Whole days covering `delta`, rounded up. `None` unless positive.
fn ceil_days(delta: chrono::Duration) -> Option<u64> {
    let millis = delta.num_milliseconds();
    if millis <= 0 {
        return None;
    }
    u64::try_from((millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY).ok()
}

/// Parses one end of a stay from client input.
fn parse_stay_instant(field: &str, raw: &str) -> CoreResult<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        }
        .into());
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Utc
            .from_utc_datetime(&date.and_time(NaiveTime::MIN))
            .fixed_offset());
    }

    DateTime::parse_from_rfc3339(raw)
        .map_err(|_| {
            ValidationError::InvalidFormat {
                field: field.to_string(),
                reason: format!("expected YYYY-MM-DD or RFC 3339, got '{}'", raw),
            }
            .into()
        })
}

// =============================================================================
// Unit Tests
// =============================================================================
