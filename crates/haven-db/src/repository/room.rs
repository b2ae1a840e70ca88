//! # Room Repository
//!
//! Hotels, rooms and the availability search.
//!
//! ## Availability
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A room is available for [check_in, check_out) when no CONFIRMED       │
//! │  booking on it satisfies                                                │
//! │                                                                         │
//! │      existing.check_in < check_out AND existing.check_out > check_in    │
//! │                                                                         │
//! │  Pending and cancelled bookings never hide a room. Results are a       │
//! │  snapshot: creating a booking re-checks inside the insert.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use haven_core::{Hotel, Room, RoomListing};

/// Filters for [`RoomRepository::search_available`].
///
/// `stay` is either both dates or nothing; half a range is rejected
/// before it gets here.
#[derive(Debug, Clone, Default)]
pub struct RoomFilter {
    pub stay: Option<(NaiveDate, NaiveDate)>,
    pub city: Option<String>,
    pub hotel_id: Option<String>,
    pub min_capacity: Option<i64>,
}

/// Repository for room and hotel database operations.
#[derive(Debug, Clone)]
pub struct RoomRepository {
    pool: SqlitePool,
}

impl RoomRepository {
    /// Creates a new RoomRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RoomRepository { pool }
    }

    /// Inserts a hotel.
    pub async fn insert_hotel(&self, hotel: &Hotel) -> DbResult<()> {
        debug!(id = %hotel.id, name = %hotel.name, "Inserting hotel");

        sqlx::query("INSERT INTO hotels (id, name, city, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(&hotel.id)
            .bind(&hotel.name)
            .bind(&hotel.city)
            .bind(hotel.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Inserts a room.
    pub async fn insert_room(&self, room: &Room) -> DbResult<()> {
        debug!(id = %room.id, hotel_id = %room.hotel_id, "Inserting room");

        sqlx::query(
            r#"
            INSERT INTO rooms (
                id, hotel_id, name, capacity,
                price_per_night_cents, currency, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&room.id)
        .bind(&room.hotel_id)
        .bind(&room.name)
        .bind(room.capacity)
        .bind(room.price_per_night_cents)
        .bind(&room.currency)
        .bind(room.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a room by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Room>> {
        let room = sqlx::query_as::<_, Room>(
            r#"
            SELECT id, hotel_id, name, capacity, price_per_night_cents, currency, created_at
            FROM rooms
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(room)
    }

    /// Counts hotels (used by the seeder to stay idempotent).
    pub async fn count_hotels(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM hotels")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Lists rooms matching the filter, cheapest first.
    ///
    /// ## Query Shape
    /// ```text
    /// SELECT r.*, h.name, h.city FROM rooms r JOIN hotels h
    /// WHERE [h.city = ?] [r.hotel_id = ?] [r.capacity >= ?]
    ///   [NOT EXISTS (confirmed booking overlapping the stay)]
    /// ORDER BY price, id
    /// ```
    pub async fn search_available(&self, filter: &RoomFilter) -> DbResult<Vec<RoomListing>> {
        debug!(?filter, "Searching available rooms");

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT
                r.id, r.hotel_id, r.name, r.capacity,
                r.price_per_night_cents, r.currency, r.created_at,
                h.name AS hotel_name,
                h.city AS city
            FROM rooms r
            JOIN hotels h ON h.id = r.hotel_id
            WHERE 1 = 1
            "#,
        );

        if let Some(city) = &filter.city {
            query.push(" AND h.city = ").push_bind(city.clone());
        }
        if let Some(hotel_id) = &filter.hotel_id {
            query.push(" AND r.hotel_id = ").push_bind(hotel_id.clone());
        }
        if let Some(min_capacity) = filter.min_capacity {
            query.push(" AND r.capacity >= ").push_bind(min_capacity);
        }
        if let Some((check_in, check_out)) = filter.stay {
            query
                .push(
                    r#"
                AND NOT EXISTS (
                    SELECT 1 FROM bookings b
                    WHERE b.room_id = r.id
                      AND b.status = 'confirmed'
                      AND b.check_in < "#,
                )
                .push_bind(check_out)
                .push(" AND b.check_out > ")
                .push_bind(check_in)
                .push(")");
        }
        query.push(" ORDER BY r.price_per_night_cents, r.id");

        let listings = query
            .build_query_as::<RoomListing>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = listings.len(), "Available rooms found");
        Ok(listings)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{self, date};

    fn stay(check_in: &str, check_out: &str) -> RoomFilter {
        RoomFilter {
            stay: Some((date(check_in), date(check_out))),
            ..RoomFilter::default()
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_room() {
        let db = fixtures::db().await;
        let room = fixtures::room(&db, 26_000, 2).await;

        let found = db.rooms().get_by_id(&room.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Deluxe King");
        assert_eq!(found.price_per_night_cents, 26_000);
        assert!(db.rooms().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_pending_booking_does_not_hide_room() {
        let db = fixtures::db().await;
        let room = fixtures::room(&db, 10_000, 2).await;
        let booking = fixtures::booking(&room, "u1", "2024-03-01", "2024-03-04");
        db.bookings().insert_if_available(&booking).await.unwrap();

        let rooms = db.rooms().search_available(&stay("2024-03-02", "2024-03-03")).await.unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].hotel_name, "Nile View");
    }

    #[tokio::test]
    async fn test_confirmed_booking_hides_room() {
        let db = fixtures::db().await;
        let room = fixtures::room(&db, 10_000, 2).await;
        let booking = fixtures::booking(&room, "u1", "2024-03-01", "2024-03-04");
        db.bookings().insert_if_available(&booking).await.unwrap();
        fixtures::confirm(&db, &booking.id).await;

        let rooms = db.rooms().search_available(&stay("2024-03-02", "2024-03-03")).await.unwrap();
        assert!(rooms.is_empty());
    }

    #[tokio::test]
    async fn test_touching_stays_do_not_overlap() {
        let db = fixtures::db().await;
        let room = fixtures::room(&db, 10_000, 2).await;
        let booking = fixtures::booking(&room, "u1", "2024-03-01", "2024-03-04");
        db.bookings().insert_if_available(&booking).await.unwrap();
        fixtures::confirm(&db, &booking.id).await;

        let after = db.rooms().search_available(&stay("2024-03-04", "2024-03-06")).await.unwrap();
        assert_eq!(after.len(), 1);
        let before = db.rooms().search_available(&stay("2024-02-27", "2024-03-01")).await.unwrap();
        assert_eq!(before.len(), 1);
    }

    #[tokio::test]
    async fn test_filters_and_ordering() {
        let db = fixtures::db().await;
        let pricey = fixtures::room(&db, 30_000, 4).await;
        let cheap = fixtures::room(&db, 8_000, 1).await;

        let all = db.rooms().search_available(&RoomFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].room.id, cheap.id);

        let family = RoomFilter {
            min_capacity: Some(3),
            ..RoomFilter::default()
        };
        let rooms = db.rooms().search_available(&family).await.unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].room.id, pricey.id);

        let by_hotel = RoomFilter {
            hotel_id: Some(cheap.hotel_id.clone()),
            city: Some("Cairo".to_string()),
            ..RoomFilter::default()
        };
        let rooms = db.rooms().search_available(&by_hotel).await.unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].room.id, cheap.id);
    }
}
