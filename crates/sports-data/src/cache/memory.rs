//! In-memory layer using moka

use std::sync::Arc;

use moka::future::Cache;
use moka::policy::EvictionPolicy;

use super::entry::CacheEntry;
use super::key::CacheKey;

/// Bounded in-memory layer. Evicts the least recently used entry once
/// `capacity` is reached.
///
/// Expiry is not delegated to moka: TTLs depend on the entry's class and the
/// injected clock, so staleness is checked by the caller on read.
pub(crate) struct MemoryCache {
    entries: Cache<CacheKey, Arc<CacheEntry>>,
}

impl MemoryCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .eviction_policy(EvictionPolicy::lru())
                .build(),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        self.entries.get(key).await
    }

    pub async fn insert(&self, key: CacheKey, entry: Arc<CacheEntry>) {
        self.entries.insert(key, entry).await;
    }

    pub async fn invalidate(&self, key: &CacheKey) {
        self.entries.invalidate(key).await;
    }

    pub async fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks().await;
    }

    /// Remove every entry the predicate rejects.
    pub async fn retain(&self, keep: impl Fn(&CacheEntry) -> bool) -> usize {
        let stale: Vec<Arc<CacheKey>> = self
            .entries
            .iter()
            .filter(|(_, entry)| !keep(entry))
            .map(|(key, _)| key)
            .collect();
        for key in &stale {
            self.entries.invalidate(key.as_ref()).await;
        }
        stale.len()
    }

    /// Approximate entry count after pending maintenance has run.
    pub async fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}
