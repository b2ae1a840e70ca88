//! # Domain Types
//!
//! Core domain types used throughout Haven.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Room       │   │     Booking     │   │     Payment     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  room_id        │◄──│  booking_id (1) │       │
//! │  │  hotel_id       │   │  user_id        │   │  provider_order │       │
//! │  │  capacity       │   │  check_in/out   │   │  session_token  │       │
//! │  │  price / night  │   │  nights, total  │   │  status         │       │
//! │  └─────────────────┘   │  status         │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │                                                                         │
//! │  BookingStatus: pending ──► confirmed (webhook)                         │
//! │                    └──────► cancelled (owner)                           │
//! │                                                                         │
//! │  PaymentStatus: initiated ──► paid | failed   (webhook only)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::dates::DateRange;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Hotel
// =============================================================================

/// A hotel; only its display data matters to the booking flow.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub city: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Room
// =============================================================================

/// A bookable room. Immutable for the purposes of the booking flow.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Room {
    pub id: String,
    pub hotel_id: String,
    /// Display name ("Deluxe King", "Family Suite").
    pub name: String,
    /// Maximum number of guests.
    pub capacity: i64,
    /// Nightly price in minor units.
    pub price_per_night_cents: i64,
    /// ISO 4217 code, inherited by bookings on this room.
    pub currency: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Room {
    #[inline]
    pub fn price_per_night(&self) -> Money {
        Money::from_cents(self.price_per_night_cents)
    }

    /// Total for a stay, computed server-side.
    pub fn quote(&self, stay: &DateRange) -> CoreResult<Money> {
        self.price_per_night()
            .checked_times(stay.nights())
            .ok_or(CoreError::AmountOverflow {
                nights: stay.nights(),
                price_cents: self.price_per_night_cents,
            })
    }
}

/// A room as returned by the availability query, with hotel display data.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RoomListing {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub room: Room,
    pub hotel_name: String,
    pub city: String,
}

// =============================================================================
// Booking Status
// =============================================================================

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Created, awaiting payment. Does not block other bookings.
    Pending,
    /// Paid. Blocks overlapping bookings on the same room.
    Confirmed,
    /// Cancelled by its owner while pending.
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BookingStatus::Pending)
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::Pending
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Booking
// =============================================================================

/// A user's reservation of a room for a stay.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub room_id: String,
    #[ts(as = "String")]
    pub check_in: NaiveDate,
    #[ts(as = "String")]
    pub check_out: NaiveDate,
    /// Derived from the dates, always >= 1.
    pub nights: i64,
    /// Derived: nights × room price, in minor units.
    pub total_amount_cents: i64,
    pub currency: String,
    pub status: BookingStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    /// The stay as a validated range.
    pub fn stay(&self) -> CoreResult<DateRange> {
        DateRange::new(self.check_in, self.check_out)
    }

    #[inline]
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Checks that the owner may cancel (only while pending).
    pub fn ensure_cancellable(&self) -> CoreResult<()> {
        match self.status {
            BookingStatus::Pending => Ok(()),
            other => Err(CoreError::InvalidTransition {
                entity: "booking",
                from: other.to_string(),
                to: BookingStatus::Cancelled.to_string(),
            }),
        }
    }
}

/// A booking joined with its room and hotel display names.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BookingSummary {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub booking: Booking,
    pub room_name: String,
    pub hotel_name: String,
}

// =============================================================================
// Payment Status
// =============================================================================

/// Status of the single payment attempt attached to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Session created at the gateway, outcome unknown.
    Initiated,
    /// Gateway reported a successful charge. Immutable from here.
    Paid,
    /// Gateway reported a declined or errored charge.
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Initiated => "initiated",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }

    /// Decides what a verified gateway callback does to this payment.
    ///
    /// ## Transition Table
    /// ```text
    /// ┌────────────┬──────────┬────────────────────────────────────────────┐
    /// │ current    │ outcome  │ result                                     │
    /// ├────────────┼──────────┼────────────────────────────────────────────┤
    /// │ initiated  │ success  │ paid, confirm booking, booking_confirmed   │
    /// │ initiated  │ failure  │ failed, booking untouched, payment_failed  │
    /// │ failed     │ success  │ same as initiated + success (late capture) │
    /// │ failed     │ failure  │ replay, no-op                              │
    /// │ paid       │ any      │ replay, no-op                              │
    /// └────────────┴──────────┴────────────────────────────────────────────┘
    /// ```
    pub fn on_callback(&self, success: bool) -> CallbackTransition {
        match (self, success) {
            (PaymentStatus::Paid, _) => CallbackTransition::Replay,
            (PaymentStatus::Failed, false) => CallbackTransition::Replay,
            (PaymentStatus::Initiated | PaymentStatus::Failed, true) => {
                CallbackTransition::Apply {
                    payment: PaymentStatus::Paid,
                    confirm_booking: true,
                    notification: NotificationKind::BookingConfirmed,
                }
            }
            (PaymentStatus::Initiated, false) => CallbackTransition::Apply {
                payment: PaymentStatus::Failed,
                confirm_booking: false,
                notification: NotificationKind::PaymentFailed,
            },
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`PaymentStatus::on_callback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackTransition {
    /// Redelivery of an already-applied outcome: change nothing.
    Replay,
    /// Apply atomically: payment status, optional booking confirmation, notification.
    Apply {
        payment: PaymentStatus,
        confirm_booking: bool,
        notification: NotificationKind,
    },
}

// =============================================================================
// Payment
// =============================================================================

/// The payment record for a booking (at most one per booking).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: String,
    /// Unique: one payment row per booking.
    pub booking_id: String,
    pub provider: String,
    /// Order id assigned by the gateway.
    pub provider_order_id: Option<String>,
    /// Payment key handed to the embedded checkout.
    pub session_token: Option<String>,
    pub amount_cents: i64,
    pub currency: String,
    pub status: PaymentStatus,
    /// Last provider payload (JSON text), kept for audit.
    pub raw_payload: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// A still-initiated session with a token can be handed out again.
    pub fn reusable_session(&self) -> Option<&str> {
        match (self.status, self.session_token.as_deref()) {
            (PaymentStatus::Initiated, Some(token)) if !token.is_empty() => Some(token),
            _ => None,
        }
    }
}

// =============================================================================
// Notifications
// =============================================================================

/// Kind of in-app notification produced by reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    BookingConfirmed,
    PaymentFailed,
    /// Charge captured but the booking could not be confirmed.
    BookingConflict,
}

impl NotificationKind {
    /// Default title and body shown to the user.
    pub fn render(&self, booking_id: &str) -> (String, String) {
        match self {
            NotificationKind::BookingConfirmed => (
                "Booking confirmed".to_string(),
                format!("Your payment was received and booking {} is confirmed.", booking_id),
            ),
            NotificationKind::PaymentFailed => (
                "Payment failed".to_string(),
                format!(
                    "The payment for booking {} did not go through. You can try again.",
                    booking_id
                ),
            ),
            NotificationKind::BookingConflict => (
                "Booking needs attention".to_string(),
                format!(
                    "We received your payment for booking {} but the room is no longer available. Our team will contact you about a refund.",
                    booking_id
                ),
            ),
        }
    }
}

/// An in-app notification.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
