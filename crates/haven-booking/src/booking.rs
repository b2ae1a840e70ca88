//! # Booking Lifecycle Manager
//!
//! Creates pending bookings, lists and reads them, cancels them, and
//! answers availability searches.
//!
//! ## createBooking
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  raw fields ──► validate_booking_request ── missing ──► InvalidInput    │
//! │                        │                 ── 0 nights ─► InvalidDateRange│
//! │                        ▼                                                │
//! │                 load room ─────────────────── none ───► RoomNotFound    │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                 quote = nights × price (checked)                        │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                 insert_if_available ── overlap ───────► RoomUnavailable │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                 Booking { status: pending }                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{BookingError, BookingResult};
use haven_core::validation::{require, validate_booking_request, validate_capacity};
use haven_core::{Booking, BookingStatus, BookingSummary, DateRange, PaymentStatus, RoomListing};
use haven_db::{Database, RoomFilter};

/// Raw create-booking input; every field optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBooking {
    pub room_id: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
}

/// Raw availability query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailabilityQuery {
    pub city: Option<String>,
    pub hotel_id: Option<String>,
    pub min_capacity: Option<i64>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
}

/// A booking together with the status of its payment, for client polling.
#[derive(Debug, Clone, Serialize)]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub payment_status: Option<PaymentStatus>,
}

/// Booking operations over an explicit store handle.
#[derive(Debug, Clone)]
pub struct BookingManager {
    db: Database,
}

impl BookingManager {
    pub fn new(db: Database) -> Self {
        BookingManager { db }
    }

    /// Creates a pending booking with a server-computed total.
    pub async fn create_booking(&self, user_id: &str, input: &CreateBooking) -> BookingResult<Booking> {
        let request = validate_booking_request(
            input.room_id.as_deref(),
            input.check_in.as_deref(),
            input.check_out.as_deref(),
        )?;

        let room = self
            .db
            .rooms()
            .get_by_id(&request.room_id)
            .await?
            .ok_or_else(|| BookingError::RoomNotFound(request.room_id.clone()))?;

        let total = room.quote(&request.stay)?;
        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            room_id: room.id.clone(),
            check_in: request.stay.check_in(),
            check_out: request.stay.check_out(),
            nights: request.stay.nights(),
            total_amount_cents: total.cents(),
            currency: room.currency.clone(),
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.db.bookings().insert_if_available(&booking).await {
            let err = BookingError::from(e);
            if let BookingError::RoomUnavailable { .. } = err {
                debug!(room_id = %room.id, stay = %request.stay, "Room unavailable");
            }
            return Err(err);
        }

        info!(
            booking_id = %booking.id,
            room_id = %booking.room_id,
            nights = booking.nights,
            total = %booking.total_amount(),
            "Booking created"
        );
        Ok(booking)
    }

    /// The user's bookings, newest first.
    pub async fn list_bookings(&self, user_id: &str) -> BookingResult<Vec<BookingSummary>> {
        Ok(self.db.bookings().list_for_user(user_id).await?)
    }

    /// One of the user's bookings with its payment status.
    pub async fn get_booking(&self, user_id: &str, booking_id: &str) -> BookingResult<BookingDetails> {
        let booking = owned_booking(&self.db, user_id, booking_id).await?;
        let payment_status = self
            .db
            .payments()
            .get_by_booking(&booking.id)
            .await?
            .map(|p| p.status);

        Ok(BookingDetails {
            booking,
            payment_status,
        })
    }

    /// Cancels one of the user's bookings while it is still pending.
    pub async fn cancel_booking(&self, user_id: &str, booking_id: &str) -> BookingResult<Booking> {
        let booking = owned_booking(&self.db, user_id, booking_id).await?;
        booking.ensure_cancellable()?;

        match self.db.bookings().cancel(&booking.id, user_id).await? {
            Some(cancelled) => {
                info!(booking_id = %cancelled.id, "Booking cancelled");
                Ok(cancelled)
            }
            // Confirmed between the read and the update
            None => {
                warn!(booking_id = %booking.id, "Booking left pending before it could be cancelled");
                Err(BookingError::InvalidState(format!(
                    "booking {} is no longer pending",
                    booking.id
                )))
            }
        }
    }

    /// Rooms matching the query with no confirmed booking over the stay.
    pub async fn search_available(&self, query: &AvailabilityQuery) -> BookingResult<Vec<RoomListing>> {
        let stay = match (query.check_in.as_deref(), query.check_out.as_deref()) {
            (None, None) => None,
            (Some(check_in), Some(check_out)) => {
                let range = DateRange::parse(check_in, check_out)?;
                Some((range.check_in(), range.check_out()))
            }
            _ => {
                return Err(BookingError::InvalidInput(
                    "check_in and check_out must be given together".to_string(),
                ))
            }
        };

        if let Some(min_capacity) = query.min_capacity {
            validate_capacity(min_capacity).map_err(|e| BookingError::InvalidInput(e.to_string()))?;
        }

        let filter = RoomFilter {
            stay,
            city: non_blank(query.city.as_deref()),
            hotel_id: non_blank(query.hotel_id.as_deref()),
            min_capacity: query.min_capacity,
        };

        Ok(self.db.rooms().search_available(&filter).await?)
    }
}

/// Loads a booking the user owns. Someone else's booking is NotFound.
pub(crate) async fn owned_booking(db: &Database, user_id: &str, booking_id: &str) -> BookingResult<Booking> {
    let booking_id = require("booking_id", Some(booking_id))
        .map_err(|e| BookingError::InvalidInput(e.to_string()))?;

    match db.bookings().get_by_id(booking_id).await? {
        Some(booking) if booking.is_owned_by(user_id) => Ok(booking),
        _ => Err(BookingError::not_found("Booking", booking_id)),
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Unit Tests
// =============================================================================
