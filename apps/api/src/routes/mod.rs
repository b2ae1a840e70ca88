//! HTTP handlers, one module per resource.

pub mod bookings;
pub mod health;
pub mod notifications;
pub mod payments;
pub mod rooms;
