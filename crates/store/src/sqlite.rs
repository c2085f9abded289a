//! SQLite-backed airport repository using sqlx.
//!
//! Schema: `airports(icao, iata, name, country, municipality, elevation_ft,
//! longitude, latitude)` with `icao` as primary key. A location is stored
//! only when both coordinates are present.

use async_trait::async_trait;
use planetrack_types::{AirportRecord, AirportRepository, GeoPoint, error::Result};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;

type AirportRow = (
    String,
    Option<String>,
    String,
    String,
    Option<String>,
    Option<i32>,
    Option<f64>,
    Option<f64>,
);

/// A persistent [`AirportRepository`] backed by `SQLite`.
pub struct SqliteAirportRepository {
    /// Connection pool to the `SQLite` database.
    pool: SqlitePool,
}

impl SqliteAirportRepository {
    /// Connects to a `SQLite` database (e.g. `"sqlite:./airports.db"` or `"sqlite::memory:"`).
    ///
    /// Creates the database file if it does not exist and ensures the schema.
    ///
    /// # Errors
    ///
    /// Returns a [`sqlx::Error`] if the connection or table creation fails.
    pub async fn new(database_url: &str) -> std::result::Result<Self, sqlx::Error> {
        let opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> std::result::Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS airports (
                icao          TEXT    PRIMARY KEY NOT NULL,
                iata          TEXT,
                name          TEXT    NOT NULL,
                country       TEXT    NOT NULL,
                municipality  TEXT,
                elevation_ft  INTEGER,
                longitude     REAL,
                latitude      REAL,
                updated_at    INTEGER NOT NULL DEFAULT (unixepoch())
            )",
        )
        .execute(pool)
        .await?;
        Ok(())
    }
}

fn record_from_row(row: AirportRow) -> AirportRecord {
    let (identifier, iata, name, country, municipality, elevation_ft, longitude, latitude) = row;
    let location = match (longitude, latitude) {
        (Some(longitude), Some(latitude)) => Some(GeoPoint {
            longitude,
            latitude,
        }),
        _ => None,
    };
    AirportRecord {
        identifier,
        iata,
        name,
        country,
        municipality,
        elevation_ft,
        location,
    }
}

#[async_trait]
impl AirportRepository for SqliteAirportRepository {
    async fn find_by_icao(&self, icao: &str) -> Result<Option<AirportRecord>> {
        let row: Option<AirportRow> = sqlx::query_as(
            "SELECT icao, iata, name, country, municipality, elevation_ft, longitude, latitude
             FROM airports WHERE icao = ?",
        )
        .bind(icao.to_ascii_uppercase())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(record_from_row))
    }

    async fn upsert(&self, record: &AirportRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO airports
                 (icao, iata, name, country, municipality, elevation_ft, longitude, latitude)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(icao) DO UPDATE SET
                 iata = excluded.iata,
                 name = excluded.name,
                 country = excluded.country,
                 municipality = excluded.municipality,
                 elevation_ft = excluded.elevation_ft,
                 longitude = excluded.longitude,
                 latitude = excluded.latitude,
                 updated_at = unixepoch()",
        )
        .bind(record.identifier.to_ascii_uppercase())
        .bind(&record.iata)
        .bind(&record.name)
        .bind(&record.country)
        .bind(&record.municipality)
        .bind(record.elevation_ft)
        .bind(record.location.map(|p| p.longitude))
        .bind(record.location.map(|p| p.latitude))
        .execute(&self.pool)
        .await?;
        tracing::debug!(icao = %record.identifier, "airport stored");
        Ok(())
    }
}
