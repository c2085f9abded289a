//! Storage backends: the bearer-token cell and airport repositories.
//!
//! Provides in-memory stores for tests and single-process use, and a
//! SQLite-backed airport repository for production.

pub mod memory;
pub mod sqlite;

pub use memory::{InMemoryAirportRepository, InMemoryTokenStore};
pub use sqlite::SqliteAirportRepository;
