//! # Repository Module
//!
//! Database repository implementations for Haven.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Service (haven-booking)                                               │
//! │       │                                                                 │
//! │       │  db.bookings().insert_if_available(&booking)                   │
//! │       ▼                                                                 │
//! │  BookingRepository                                                     │
//! │  ├── insert_if_available(&self, booking)                               │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── list_for_user(&self, user_id)                                     │
//! │  └── cancel(&self, id, user_id)                                        │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`room::RoomRepository`] - Hotels, rooms and the availability query
//! - [`booking::BookingRepository`] - Booking creation, lookup, cancellation
//! - [`payment::PaymentRepository`] - Payment sessions and callback reconciliation
//! - [`notification::NotificationRepository`] - In-app notifications

pub mod booking;
pub mod notification;
pub mod payment;
pub mod room;
