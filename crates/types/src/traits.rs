//! Traits shared across planetrack crates.
//!
//! Every cross-crate abstraction is defined here so that higher layers depend
//! only on `planetrack-types`, not on each other.

use crate::{AirportRecord, Token, error::Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Holds at most one bearer token.
///
/// Pure storage with no validation logic. Implementations must replace the
/// token atomically: a reader sees either the previous token or the new one,
/// never a mix.
pub trait TokenStore: Send + Sync {
    /// Snapshot of the current token, if any.
    fn get(&self) -> Option<Arc<Token>>;
    /// Replace the current token.
    fn set(&self, token: Token);
}

/// Stored airport records keyed by ICAO identifier.
#[async_trait]
pub trait AirportRepository: Send + Sync {
    /// Look up an airport by identifier; `None` if it is not stored.
    async fn find_by_icao(&self, icao: &str) -> Result<Option<AirportRecord>>;
    /// Insert or replace a record.
    async fn upsert(&self, record: &AirportRecord) -> Result<()>;
}
