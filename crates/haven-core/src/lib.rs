//! # haven-core: Pure Booking Logic for Haven
//!
//! This crate holds the rules every other Haven crate relies on: how many
//! nights a stay has, what it costs, when two stays collide, and which
//! status transitions are legal. Nothing here touches a database or network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Haven Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    haven-api (axum HTTP)                        │   │
//! │  │   /bookings ── /payments/session ── /payments/webhook           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        haven-booking (lifecycle, sessions, reconciler)          │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────┐  ┌────────────▼────────────────────┐  │
//! │  │ ★ haven-core (THIS CRATE) ★ │  │  haven-db (SQLite, triggers)    │  │
//! │  │  Money · DateRange · types  │◄─│  rooms, bookings, payments      │  │
//! │  │  validation · errors        │  │  notifications                  │  │
//! │  └─────────────────────────────┘  └─────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Room, Booking, Payment, Notification)
//! - [`money`] - Money type with integer arithmetic in minor units
//! - [`dates`] - Half-open stay ranges, nights, overlap test
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation for booking requests
//!
//! ## Example Usage
//!
//! ```rust
//! use haven_core::dates::DateRange;
//! use haven_core::money::Money;
//!
//! let stay = DateRange::parse("2024-03-01", "2024-03-04").unwrap();
//! assert_eq!(stay.nights(), 3);
//!
//! let total = Money::from_cents(26_000).checked_times(stay.nights()).unwrap();
//! assert_eq!(total.cents(), 78_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dates;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use dates::DateRange;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Provider name recorded on every payment row.
pub const PAYMENT_PROVIDER: &str = "paymob";
