//! In-memory stores: a lock-free token cell and a `HashMap` airport table.

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use planetrack_types::{AirportRecord, AirportRepository, Token, TokenStore, error::Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A [`TokenStore`] holding one token behind an atomically swapped pointer.
///
/// Readers never block and never observe a partially written token.
#[derive(Default)]
pub struct InMemoryTokenStore {
    current: ArcSwapOption<Token>,
}

impl InMemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `token`.
    #[must_use]
    pub fn with_token(token: Token) -> Self {
        Self {
            current: ArcSwapOption::from_pointee(token),
        }
    }
}

impl TokenStore for InMemoryTokenStore {
    fn get(&self) -> Option<Arc<Token>> {
        self.current.load_full()
    }

    fn set(&self, token: Token) {
        self.current.store(Some(Arc::new(token)));
    }
}

/// An [`AirportRepository`] for tests and for running without a database.
#[derive(Default)]
pub struct InMemoryAirportRepository {
    /// Identifier-keyed airport map.
    data: RwLock<HashMap<String, AirportRecord>>,
}

impl InMemoryAirportRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AirportRepository for InMemoryAirportRepository {
    async fn find_by_icao(&self, icao: &str) -> Result<Option<AirportRecord>> {
        let data = self.data.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(data.get(&icao.to_ascii_uppercase()).cloned())
    }

    async fn upsert(&self, record: &AirportRecord) -> Result<()> {
        self.data
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(record.identifier.to_ascii_uppercase(), record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planetrack_types::GeoPoint;

    fn token(access: &str) -> Token {
        Token::issued(access, "Bearer", Some(1800), 1_700_000_000)
    }

    fn airport(ident: &str, name: &str) -> AirportRecord {
        AirportRecord {
            identifier: ident.into(),
            iata: None,
            name: name.into(),
            country: "HN".into(),
            municipality: None,
            elevation_ft: None,
            location: Some(GeoPoint {
                longitude: -87.92,
                latitude: 15.45,
            }),
        }
    }

    #[test]
    fn test_empty_token_store() {
        assert!(InMemoryTokenStore::new().get().is_none());
    }

    #[test]
    fn test_set_and_get() {
        let store = InMemoryTokenStore::new();
        store.set(token("first"));
        assert_eq!(store.get().unwrap().access_token, "first");
    }

    #[test]
    fn test_set_replaces_wholesale() {
        let store = InMemoryTokenStore::with_token(token("first"));
        let before = store.get().unwrap();
        store.set(token("second"));
        // earlier snapshots stay intact
        assert_eq!(before.access_token, "first");
        assert_eq!(store.get().unwrap().access_token, "second");
    }

    #[tokio::test]
    async fn test_concurrent_readers_see_whole_tokens() {
        let store = Arc::new(InMemoryTokenStore::with_token(token("t0")));
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.set(token(&format!("t{i}")));
                let seen = store.get().unwrap();
                assert!(seen.access_token.starts_with('t'));
                assert_eq!(seen.expires_at, Some(1_700_001_800));
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_airport_lookup_missing() {
        let repo = InMemoryAirportRepository::new();
        assert!(repo.find_by_icao("KJFK").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_airport_upsert_and_lookup_case_insensitive() {
        let repo = InMemoryAirportRepository::new();
        repo.upsert(&airport("MHLM", "La Mesa")).await.unwrap();
        let found = repo.find_by_icao("mhlm").await.unwrap().unwrap();
        assert_eq!(found.name, "La Mesa");
    }

    #[tokio::test]
    async fn test_airport_overwrite() {
        let repo = InMemoryAirportRepository::new();
        repo.upsert(&airport("MHLM", "old")).await.unwrap();
        repo.upsert(&airport("MHLM", "new")).await.unwrap();
        assert_eq!(repo.find_by_icao("MHLM").await.unwrap().unwrap().name, "new");
    }
}
