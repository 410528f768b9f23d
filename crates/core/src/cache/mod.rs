//! Memoization of provider lookups.
//!
//! The cache only records when an entry was created. Whether an entry is
//! still usable is up to the caller, which compares its age against its
//! own max age, so providers with different staleness tolerances can share
//! one cache.

mod memory;

pub use memory::InMemoryCache;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

use crate::torrent::TorrentResult;

/// Errors from a cache backend.
///
/// The in-memory cache never fails; fallible backends report here.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// A cached result list and when it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub results: Vec<TorrentResult>,
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(results: Vec<TorrentResult>) -> Self {
        Self {
            results,
            created_at: Utc::now(),
        }
    }

    /// Time elapsed since the entry was stored (zero if the clock went backwards).
    pub fn age(&self) -> Duration {
        (Utc::now() - self.created_at).to_std().unwrap_or_default()
    }

    /// Whether the entry is no older than `max_age`.
    pub fn is_fresh(&self, max_age: Duration) -> bool {
        self.age() <= max_age
    }
}

/// Storage contract consumed by providers.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Replace whatever is stored under `key` with `results`, stamped now.
    async fn set(&self, key: &str, results: Vec<TorrentResult>) -> Result<(), CacheError>;

    /// Look up `key`. `Ok(None)` is a miss.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;
}

/// Cache key for a lookup of `id` on `provider`, e.g. `tt0133093-YTS`.
pub fn cache_key(id: &str, provider: &str) -> String {
    format!("{}-{}", id, provider.to_uppercase())
}
