//! # haven-booking: Booking and Payment Services for Haven
//!
//! Service layer between the HTTP surface and the store. Every operation
//! takes the acting user's id explicitly and works against a [`Database`]
//! handle passed in at construction.
//!
//! ## Payment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  BookingManager::create_booking ──► Booking { pending }                │
//! │            │                                                            │
//! │            ▼                                                            │
//! │  PaymentSessionManager::initiate_payment                               │
//! │     auth ─► order(merchant_order_id = booking id) ─► payment key       │
//! │            │                                                            │
//! │            ▼                                                            │
//! │  guest pays in the gateway iframe                                      │
//! │            │                                                            │
//! │            ▼                                                            │
//! │  WebhookReconciler::handle_callback                                    │
//! │     verify HMAC ─► reconcile payment + booking + notification          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`booking`] - Create, list, read, cancel; availability search
//! - [`session`] - Gateway payment sessions, reused while still open
//! - [`webhook`] - Verified callback reconciliation
//! - [`callback`] - Callback payload parsing (JSON body or query string)
//! - [`signature`] - HMAC-SHA512 callback signatures
//! - [`gateway`] - Gateway trait, Paymob client, in-memory gateway
//! - [`error`] - Service error type
//!
//! [`Database`]: haven_db::Database

pub mod booking;
pub mod callback;
pub mod error;
pub mod gateway;
pub mod session;
pub mod signature;
pub mod webhook;

#[cfg(test)]
mod testing;

pub use booking::{AvailabilityQuery, BookingDetails, BookingManager, CreateBooking};
pub use callback::TransactionCallback;
pub use error::{BookingError, BookingResult};
pub use gateway::{GatewayConfig, GatewayError, InMemoryGateway, PaymentGateway, PaymobClient};
pub use session::{PaymentSession, PaymentSessionManager};
pub use signature::CallbackSigner;
pub use webhook::{WebhookOutcome, WebhookReconciler};
