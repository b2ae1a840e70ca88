//! # haven-db: Booking Store for Haven
//!
//! This crate provides database access for the Haven booking/payment flow.
//! It uses SQLite with sqlx for async operations. The database is the
//! source of truth: constraints and triggers enforce the invariants the
//! services rely on.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Haven Data Flow                                │
//! │                                                                         │
//! │  BookingManager / PaymentSessionManager / WebhookReconciler            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     haven-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ RoomRepo       │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ BookingRepo    │   │ tables       │  │   │
//! │  │   │               │    │ PaymentRepo    │   │ triggers     │  │   │
//! │  │   │               │    │ NotificationRepo│  │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (overlap triggers are the authority of last resort)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use haven_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./data/haven.db")).await?;
//! let bookings = db.bookings().list_for_user("user-1").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::booking::BookingRepository;
pub use repository::notification::NotificationRepository;
pub use repository::payment::{NewPaymentSession, PaymentRepository, ReconcileOutcome};
pub use repository::room::{RoomFilter, RoomRepository};
