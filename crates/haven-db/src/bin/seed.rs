//! # Seed Data Generator
//!
//! Populates the database with demo hotels and rooms for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p haven-db --bin seed
//! cargo run -p haven-db --bin seed -- --db ./data/haven.db
//! ```
//!
//! Every hotel gets the same four room types; prices vary per city.

use anyhow::Context;
use chrono::Utc;
use haven_core::{Hotel, Room};
use haven_db::{Database, DbConfig};
use std::env;
use uuid::Uuid;

/// (hotel name, city, price multiplier in percent)
const HOTELS: &[(&str, &str, i64)] = &[
    ("Nile View", "Cairo", 100),
    ("Corniche Palace", "Alexandria", 90),
    ("Red Sea Reef", "Hurghada", 120),
    ("Old Town Inn", "Luxor", 75),
];

/// (room name, capacity, base nightly price in cents)
const ROOM_TYPES: &[(&str, i64, i64)] = &[
    ("Standard Twin", 2, 9_500),
    ("Deluxe King", 2, 14_000),
    ("Family Suite", 4, 26_000),
    ("Single Economy", 1, 6_000),
];

fn parse_db_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./haven_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if let Some(path) = args.get(i + 1) {
                    db_path = path.clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Haven Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./haven_dev.db)");
                println!("  -h, --help         Show this help message");
                return None;
            }
            _ => {}
        }
        i += 1;
    }

    Some(db_path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(db_path) = parse_db_path() else {
        return Ok(());
    };

    println!("Haven Seed Data Generator");
    println!("Database: {}", db_path);

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {}", db_path))?;

    let existing = db.rooms().count_hotels().await?;
    if existing > 0 {
        println!("Database already has {} hotels, skipping seed.", existing);
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    let mut rooms = 0;
    for (hotel_name, city, multiplier) in HOTELS {
        let hotel = Hotel {
            id: Uuid::new_v4().to_string(),
            name: hotel_name.to_string(),
            city: city.to_string(),
            created_at: Utc::now(),
        };
        db.rooms()
            .insert_hotel(&hotel)
            .await
            .with_context(|| format!("inserting hotel {}", hotel_name))?;

        for (room_name, capacity, base_cents) in ROOM_TYPES {
            let room = Room {
                id: Uuid::new_v4().to_string(),
                hotel_id: hotel.id.clone(),
                name: room_name.to_string(),
                capacity: *capacity,
                price_per_night_cents: base_cents * multiplier / 100,
                currency: "USD".to_string(),
                created_at: Utc::now(),
            };
            db.rooms().insert_room(&room).await?;
            rooms += 1;
        }
    }

    println!("Seeded {} hotels and {} rooms", HOTELS.len(), rooms);
    db.close().await;
    Ok(())
}
