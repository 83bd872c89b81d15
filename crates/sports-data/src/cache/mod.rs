//! Two-layer TTL cache with per-key locking and single-flight resolution.
//!
//! Reads go memory, then disk; a disk hit is promoted into memory. Writes go
//! through to both layers. Staleness is decided on read against the injected
//! [`Clock`], so expired entries are never served.

mod clock;
mod disk;
mod entry;
mod key;
mod memory;
mod single_flight;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, TtlClass, TtlPolicy, ENTRY_VERSION};
pub use key::CacheKey;

use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use log::{debug, warn};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinError;

use crate::errors::SportsDataError;
use crate::models::{DataValue, ProviderId};

use disk::DiskCache;
use memory::MemoryCache;
use single_flight::SingleFlight;

/// Cache construction settings.
#[derive(Clone, Debug)]
pub struct CacheSettings {
    /// When false every lookup misses and every write is dropped.
    pub enabled: bool,
    pub dir: PathBuf,
    pub memory_capacity: u64,
    pub ttls: TtlPolicy,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from(".cache"),
            memory_capacity: 1_000,
            ttls: TtlPolicy::default(),
        }
    }
}

/// Counters and sizes for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub memory_entries: u64,
    pub hits: u64,
    pub misses: u64,
    pub in_flight: usize,
}

/// Outcome of [`TieredCache::get_or_resolve`].
#[derive(Debug, Clone)]
pub struct CacheLookup {
    pub entry: Arc<CacheEntry>,
    /// True when the value came from a cache layer rather than a fetch made
    /// for this lookup.
    pub from_cache: bool,
}

struct Inner {
    enabled: bool,
    ttls: TtlPolicy,
    clock: Arc<dyn Clock>,
    memory: MemoryCache,
    disk: DiskCache,
    key_locks: DashMap<CacheKey, Arc<Mutex<()>>>,
    flights: SingleFlight<(Arc<CacheEntry>, bool), SportsDataError>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Memory + disk cache shared by every request. Cheap to clone.
#[derive(Clone)]
pub struct TieredCache {
    inner: Arc<Inner>,
}

impl TieredCache {
    pub fn new(settings: CacheSettings, clock: Arc<dyn Clock>) -> Self {
        debug!(
            "Cache: enabled={}, dir={}, memory capacity={}",
            settings.enabled,
            settings.dir.display(),
            settings.memory_capacity
        );
        Self {
            inner: Arc::new(Inner {
                enabled: settings.enabled,
                ttls: settings.ttls,
                clock,
                memory: MemoryCache::new(settings.memory_capacity),
                disk: DiskCache::new(settings.dir),
                key_locks: DashMap::new(),
                flights: SingleFlight::new(),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled
    }

    pub fn ttl_policy(&self) -> &TtlPolicy {
        &self.inner.ttls
    }

    async fn lock_key(&self, key: &CacheKey) -> KeyGuard<'_> {
        // The guard exists before the wait so a caller cancelled while
        // queued still releases its table slot. `acquire` is declared after
        // it and therefore dropped first, letting go of its `Arc`.
        let mut slot = KeyGuard {
            guard: None,
            locks: &self.inner.key_locks,
            key: key.clone(),
        };
        let lock = self
            .inner
            .key_locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let acquire = lock.lock_owned();
        slot.guard = Some(acquire.await);
        slot
    }

    /// Fresh entry for `key`, if any layer has one.
    pub async fn get(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        if !self.inner.enabled {
            return None;
        }

        let found = self.lookup(key).await;
        let counter = if found.is_some() {
            &self.inner.hits
        } else {
            &self.inner.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    async fn lookup(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        let now = self.inner.clock.now();

        if let Some(entry) = self.inner.memory.get(key).await {
            if entry.is_fresh(now) {
                debug!("Cache hit (memory) {}", key);
                return Some(entry);
            }
        }

        let _guard = self.lock_key(key).await;

        // Another task may have refreshed the entry while we waited.
        let now = self.inner.clock.now();
        if let Some(entry) = self.inner.memory.get(key).await {
            if entry.is_fresh(now) {
                return Some(entry);
            }
            self.inner.memory.invalidate(key).await;
        }

        match self.inner.disk.read(key).await {
            Some(entry) if entry.is_fresh(now) => {
                debug!("Cache hit (disk) {}, promoting", key);
                let entry = Arc::new(entry);
                self.inner.memory.insert(key.clone(), entry.clone()).await;
                Some(entry)
            }
            Some(_) => {
                debug!("Cache entry {} expired, deleting", key);
                self.inner.disk.remove(key).await;
                None
            }
            None => None,
        }
    }

    /// Store `value` under `key` in both layers and return the stored entry.
    ///
    /// A failed disk write is logged; the memory layer still holds the value.
    pub async fn set(
        &self,
        key: &CacheKey,
        value: DataValue,
        provider: ProviderId,
        class: TtlClass,
    ) -> Arc<CacheEntry> {
        let entry = Arc::new(CacheEntry::new(
            value,
            provider,
            self.inner.clock.now(),
            class,
            self.inner.ttls.ttl(class),
        ));
        if !self.inner.enabled {
            return entry;
        }

        let _guard = self.lock_key(key).await;
        self.inner.memory.insert(key.clone(), entry.clone()).await;
        if let Err(e) = self.inner.disk.write(key, &entry).await {
            warn!("Failed to persist cache entry {}: {}", key, e);
        }
        entry
    }

    /// Remove `key` from both layers.
    pub async fn invalidate(&self, key: &CacheKey) {
        let _guard = self.lock_key(key).await;
        self.inner.memory.invalidate(key).await;
        self.inner.disk.remove(key).await;
    }

    /// Fresh cached entry for `key`, or the outcome of `fetch`.
    ///
    /// Concurrent calls for the same key share one fetch. The fetch runs as
    /// its own task and stores a successful value before completing, so a
    /// caller that stops waiting never wastes the work. Errors are handed to
    /// every waiter and never cached.
    pub async fn get_or_resolve<Fut, A>(
        &self,
        key: &CacheKey,
        class: TtlClass,
        fetch: Fut,
        on_abort: A,
    ) -> Result<CacheLookup, SportsDataError>
    where
        Fut: Future<Output = Result<(DataValue, ProviderId), SportsDataError>> + Send + 'static,
        A: FnOnce(JoinError) -> SportsDataError + Send + 'static,
    {
        if let Some(entry) = self.get(key).await {
            return Ok(CacheLookup {
                entry,
                from_cache: true,
            });
        }

        let cache = self.clone();
        let flight_key = key.clone();
        let flight = async move {
            // A flight that just landed may have filled the cache between
            // our miss and joining.
            if let Some(entry) = cache.get(&flight_key).await {
                return Ok((entry, true));
            }
            let (value, provider) = fetch.await?;
            let entry = cache.set(&flight_key, value, provider, class).await;
            Ok::<_, SportsDataError>((entry, false))
        };

        let (entry, from_cache) = self.inner.flights.run(key, flight, on_abort).await?;
        Ok(CacheLookup { entry, from_cache })
    }

    /// Drop every entry from both layers.
    pub async fn clear(&self) {
        self.inner.memory.clear().await;
        match self.inner.disk.keys().await {
            Ok(keys) => {
                for key in keys {
                    let _guard = self.lock_key(&key).await;
                    self.inner.disk.remove(&key).await;
                }
            }
            Err(e) => warn!(
                "Failed to list cache dir {}: {}",
                self.inner.disk.dir().display(),
                e
            ),
        }
    }

    /// Delete expired and corrupt entries from both layers. Returns the
    /// number of disk files removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.inner.clock.now();
        let evicted = self.inner.memory.retain(|entry| entry.is_fresh(now)).await;

        let keys = match self.inner.disk.keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(
                    "Failed to list cache dir {}: {}",
                    self.inner.disk.dir().display(),
                    e
                );
                return 0;
            }
        };

        let mut removed = 0;
        for key in keys {
            let _guard = self.lock_key(&key).await;
            // Corrupt files are deleted by `read` itself.
            match self.inner.disk.read(&key).await {
                Some(entry) if entry.is_fresh(now) => {}
                Some(_) => {
                    self.inner.disk.remove(&key).await;
                    removed += 1;
                }
                None => removed += 1,
            }
        }

        debug!(
            "Cache purge: {} memory entries, {} files removed",
            evicted, removed
        );
        removed
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            memory_entries: self.inner.memory.entry_count().await,
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            in_flight: self.inner.flights.in_flight(),
        }
    }
}

/// Holds a per-key lock and drops the table slot once nobody else wants it.
struct KeyGuard<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a DashMap<CacheKey, Arc<Mutex<()>>>,
    key: CacheKey,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        // Only the table holds the mutex now, and nobody can clone it out
        // while the shard is locked by `remove_if`.
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Team;
    use chrono::Utc;
    use std::borrow::Cow;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};

    fn team(id: &str) -> DataValue {
        DataValue::Team(Team {
            id: id.to_string(),
            name: "Gonzaga".to_string(),
            ..Default::default()
        })
    }

    fn setup() -> (TieredCache, Arc<ManualClock>, TempDir) {
        let dir = tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = TieredCache::new(
            CacheSettings {
                dir: dir.path().to_path_buf(),
                ..Default::default()
            },
            clock.clone(),
        );
        (cache, clock, dir)
    }

    fn key(id: &str) -> CacheKey {
        CacheKey::from_parts("get_team", [("team_id", id)])
    }

    #[tokio::test]
    async fn test_cancelled_lock_waiter_leaves_no_slot() {
        let (cache, _clock, _dir) = setup();
        let k = key("2305");

        let held = cache.lock_key(&k).await;
        let waiter = tokio::spawn({
            let cache = cache.clone();
            let k = k.clone();
            async move {
                let _guard = cache.lock_key(&k).await;
            }
        });
        // Let the waiter queue on the key lock.
        tokio::task::yield_now().await;
        assert_eq!(cache.inner.key_locks.len(), 1);

        // The lock is handed to the queued waiter, which is cancelled before
        // it runs again.
        drop(held);
        waiter.abort();
        let _ = waiter.await;

        assert!(cache.inner.key_locks.is_empty());
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let (cache, _clock, _dir) = setup();
        cache
            .set(&key("2250"), team("2250"), Cow::Borrowed("espn"), TtlClass::Daily)
            .await;

        let entry = cache.get(&key("2250")).await.unwrap();
        assert_eq!(entry.payload, team("2250"));
        assert_eq!(entry.provider, "espn");
        assert_eq!(entry.ttl_secs, 86_400);
    }

    #[tokio::test]
    async fn test_live_entry_expires_after_ttl() {
        let (cache, clock, dir) = setup();
        let key = CacheKey::from_parts("get_live_scores", [("date", "2025-03-01")]);
        cache
            .set(&key, DataValue::Games(vec![]), Cow::Borrowed("espn"), TtlClass::Live)
            .await;

        clock.advance(Duration::from_secs(20));
        assert!(cache.get(&key).await.is_some());

        clock.advance(Duration::from_secs(11));
        assert!(cache.get(&key).await.is_none());
        assert!(!dir.path().join(format!("{}.json", key)).exists());
    }

    #[tokio::test]
    async fn test_disk_hit_is_promoted() {
        let (cache, clock, dir) = setup();
        cache
            .set(&key("57"), team("57"), Cow::Borrowed("ncaa"), TtlClass::Daily)
            .await;

        // A second cache over the same directory starts with an empty memory
        // layer.
        let reopened = TieredCache::new(
            CacheSettings {
                dir: dir.path().to_path_buf(),
                ..Default::default()
            },
            clock,
        );
        let entry = reopened.get(&key("57")).await.unwrap();
        assert_eq!(entry.provider, "ncaa");
        assert_eq!(reopened.stats().await.memory_entries, 1);
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let (cache, _clock, dir) = setup();
        for id in ["1", "2", "3"] {
            cache
                .set(&key(id), team(id), Cow::Borrowed("espn"), TtlClass::Daily)
                .await;
        }

        cache.invalidate(&key("1")).await;
        assert!(cache.get(&key("1")).await.is_none());
        assert!(cache.get(&key("2")).await.is_some());

        cache.clear().await;
        assert!(cache.get(&key("3")).await.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_purge_expired_removes_only_stale_files() {
        let (cache, clock, dir) = setup();
        cache
            .set(&key("live"), DataValue::Games(vec![]), Cow::Borrowed("espn"), TtlClass::Live)
            .await;
        cache
            .set(&key("daily"), team("daily"), Cow::Borrowed("espn"), TtlClass::Daily)
            .await;
        std::fs::write(dir.path().join(format!("{}.json", "b".repeat(64))), b"garbage").unwrap();

        clock.advance(Duration::from_secs(120));
        assert_eq!(cache.purge_expired().await, 2);
        assert!(cache.get(&key("daily")).await.is_some());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_disabled_cache_never_stores() {
        let dir = tempdir().unwrap();
        let cache = TieredCache::new(
            CacheSettings {
                enabled: false,
                dir: dir.path().to_path_buf(),
                ..Default::default()
            },
            Arc::new(SystemClock),
        );

        cache
            .set(&key("150"), team("150"), Cow::Borrowed("espn"), TtlClass::Daily)
            .await;
        assert!(cache.get(&key("150")).await.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_get_or_resolve_caches_success_only() {
        let (cache, _clock, _dir) = setup();
        let calls = Arc::new(AtomicUsize::new(0));
        let abort = |e: JoinError| SportsDataError::validation(e.to_string());

        let failing = {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(SportsDataError::validation("upstream down"))
            }
        };
        assert!(cache
            .get_or_resolve(&key("8"), TtlClass::Daily, failing, abort)
            .await
            .is_err());

        for _ in 0..3 {
            let calls = calls.clone();
            let fetch = async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok((team("8"), Cow::Borrowed("espn")))
            };
            let lookup = cache
                .get_or_resolve(&key("8"), TtlClass::Daily, fetch, abort)
                .await
                .unwrap();
            assert_eq!(lookup.entry.payload, team("8"));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unrelated_key_locks_are_released() {
        let (cache, _clock, _dir) = setup();
        cache
            .set(&key("1"), team("1"), Cow::Borrowed("espn"), TtlClass::Daily)
            .await;
        cache.get(&key("2")).await;
        assert!(cache.inner.key_locks.is_empty());
    }
}
