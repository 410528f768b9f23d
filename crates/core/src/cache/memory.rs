//! In-memory cache backed by a single map under a reader/writer lock.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{CacheEntry, CacheError, ResultCache};
use crate::torrent::TorrentResult;

/// Unbounded in-memory `ResultCache`.
///
/// Entries are replaced whole under the write lock and cloned out under the
/// read lock, so readers observe either the old or the new entry.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, stale ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Store a prebuilt entry, keeping its timestamp.
    pub async fn insert_entry(&self, key: &str, entry: CacheEntry) {
        self.entries.write().await.insert(key.to_string(), entry);
    }
}

#[async_trait]
impl ResultCache for InMemoryCache {
    async fn set(&self, key: &str, results: Vec<TorrentResult>) -> Result<(), CacheError> {
        let entry = CacheEntry::new(results);
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.entries.read().await.get(key).cloned())
    }
}
