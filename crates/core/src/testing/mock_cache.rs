//! Mock result cache for testing cache failure paths.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::cache::{CacheEntry, CacheError, InMemoryCache, ResultCache};
use crate::torrent::TorrentResult;

/// A `ResultCache` wrapping `InMemoryCache` whose reads and writes can be
/// made to fail on demand.
#[derive(Debug, Default)]
pub struct MockCache {
    inner: InMemoryCache,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    writes: AtomicUsize,
}

impl MockCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `set` fail.
    pub fn failing_writes(self) -> Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    /// Make every `get` fail.
    pub fn failing_reads(self) -> Self {
        self.fail_reads.store(true, Ordering::SeqCst);
        self
    }

    /// Number of `set` calls, failed ones included.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Store an entry directly, bypassing failure injection.
    pub async fn insert(&self, key: &str, entry: CacheEntry) {
        self.inner.insert_entry(key, entry).await;
    }
}

#[async_trait]
impl ResultCache for MockCache {
    async fn set(&self, key: &str, results: Vec<TorrentResult>) -> Result<(), CacheError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("mock write failure".to_string()));
        }
        self.inner.set(key, results).await
    }

    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("mock read failure".to_string()));
        }
        self.inner.get(key).await
    }
}
