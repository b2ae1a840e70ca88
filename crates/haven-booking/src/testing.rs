//! Seed helpers shared by the service tests.

use chrono::Utc;
use haven_core::{Booking, BookingStatus, DateRange, Hotel, Room};
use haven_db::{Database, DbConfig, NewPaymentSession};
use uuid::Uuid;

/// Fresh in-memory store with one Cairo hotel and one USD room.
pub async fn db_with_room(price_cents: i64) -> (Database, Room) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    let hotel = Hotel {
        id: Uuid::new_v4().to_string(),
        name: "Nile View".to_string(),
        city: "Cairo".to_string(),
        created_at: Utc::now(),
    };
    db.rooms().insert_hotel(&hotel).await.unwrap();

    let room = Room {
        id: Uuid::new_v4().to_string(),
        hotel_id: hotel.id.clone(),
        name: "Deluxe King".to_string(),
        capacity: 2,
        price_per_night_cents: price_cents,
        currency: "USD".to_string(),
        created_at: Utc::now(),
    };
    db.rooms().insert_room(&room).await.unwrap();

    (db, room)
}

/// Inserts a pending booking straight through the repository.
pub async fn pending_booking(db: &Database, room: &Room, user_id: &str, check_in: &str, check_out: &str) -> Booking {
    let stay = DateRange::parse(check_in, check_out).unwrap();
    let now = Utc::now();
    let booking = Booking {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        room_id: room.id.clone(),
        check_in: stay.check_in(),
        check_out: stay.check_out(),
        nights: stay.nights(),
        total_amount_cents: room.quote(&stay).unwrap().cents(),
        currency: room.currency.clone(),
        status: BookingStatus::Pending,
        created_at: now,
        updated_at: now,
    };
    db.bookings().insert_if_available(&booking).await.unwrap();
    booking
}

/// Stores an initiated payment session for the booking.
pub async fn session(db: &Database, booking: &Booking) {
    db.payments()
        .upsert_session(&NewPaymentSession {
            booking_id: booking.id.clone(),
            provider: haven_core::PAYMENT_PROVIDER.to_string(),
            provider_order_id: "1001".to_string(),
            session_token: "tok-1".to_string(),
            amount_cents: booking.total_amount_cents,
            currency: booking.currency.clone(),
            raw_payload: None,
        })
        .await
        .unwrap();
}

/// Confirms a booking by reconciling a successful payment against it.
pub async fn confirm(db: &Database, booking_id: &str) {
    let booking = db.bookings().get_by_id(booking_id).await.unwrap().unwrap();
    session(db, &booking).await;
    db.payments().reconcile(booking_id, Some("1001"), true, "{}").await.unwrap();
}
