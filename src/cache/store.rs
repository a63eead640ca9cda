//! The LRU cache core container.
//!
//! The ordered map is the `lru` crate's `LruCache`, built `unbounded()` so
//! eviction stays in this module's hands instead of the container's —
//! `LruCache::put` silently drops the victim on overflow, and this core
//! needs the victim's key to fire `on_evict` and keep `CacheMetrics`
//! accurate. Bounds (`max_size`, `max_memory_bytes`) are enforced by
//! popping the true least-recently-used entry after every mutation, the
//! same "evict after insert" sequencing as `database::cache::CacheManager`.

use lru::LruCache;
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use super::config::CacheConfig;
use super::entry::CacheEntry;
use super::error::Result;
use super::metrics::CacheMetrics;
use super::observer::{CacheObserver, ObserverRegistry};
use super::snapshot::{self, SnapshotRecord};

type Estimator<V> = dyn Fn(&V) -> usize + Send + Sync;

struct Inner<V> {
    store: LruCache<String, CacheEntry<V>>,
    metrics: CacheMetrics,
    total_bytes: u64,
}

/// A bounded, thread-safe LRU cache with per-entry TTL.
pub struct Cache<V> {
    inner: Mutex<Inner<V>>,
    observers: parking_lot::RwLock<ObserverRegistry<V>>,
    config: CacheConfig,
    estimator: Box<Estimator<V>>,
    stop_flag: Arc<AtomicBool>,
}

fn default_estimator<V: Serialize>(value: &V) -> usize {
    bincode::serialized_size(value).map(|n| n as usize).unwrap_or(0)
}

impl<V> Cache<V>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Build a cache and, if a Tokio runtime is currently active and the
    /// configured cleanup interval is non-zero, spawn its background
    /// sweeper.
    pub fn new(config: CacheConfig) -> Arc<Self> {
        Self::with_size_estimator(config, default_estimator::<V>)
    }

    /// Like [`Cache::new`] but with a caller-supplied size estimator,
    /// for values whose `bincode` size is not representative of their
    /// real footprint.
    pub fn with_size_estimator(
        config: CacheConfig,
        estimator: impl Fn(&V) -> usize + Send + Sync + 'static,
    ) -> Arc<Self> {
        let cache = Arc::new(Self {
            inner: Mutex::new(Inner {
                store: LruCache::unbounded(),
                metrics: CacheMetrics::default(),
                total_bytes: 0,
            }),
            observers: parking_lot::RwLock::new(ObserverRegistry::default()),
            config,
            estimator: Box::new(estimator),
            stop_flag: Arc::new(AtomicBool::new(false)),
        });

        cache.maybe_spawn_sweeper();
        cache
    }

    fn maybe_spawn_sweeper(self: &Arc<Self>) {
        let interval = self.config.cleanup_interval;
        if interval.is_zero() {
            return;
        }
        if tokio::runtime::Handle::try_current().is_err() {
            return;
        }
        let weak: Weak<Self> = Arc::downgrade(self);
        let stop_flag = self.stop_flag.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if stop_flag.load(Ordering::Relaxed) {
                    break;
                }
                match weak.upgrade() {
                    Some(cache) => cache.sweep_expired(),
                    None => break,
                }
            }
        });
    }

    /// Stop the background sweeper. Idempotent; dropping the last `Arc`
    /// has the same effect once the sweeper notices the dead weak
    /// reference on its next wake.
    pub fn shutdown(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Remove every currently-expired entry, firing `on_expire` for each.
    pub fn sweep_expired(&self) {
        let expired_keys = {
            let inner = self.inner.lock();
            inner
                .store
                .iter()
                .filter(|(_, entry)| entry.is_expired())
                .map(|(k, _)| k.clone())
                .collect::<Vec<_>>()
        };
        for key in expired_keys {
            let mut inner = self.inner.lock();
            if let Some(entry) = inner.store.pop(&key) {
                inner.total_bytes = inner.total_bytes.saturating_sub(entry.size_bytes as u64);
                inner.metrics.record_expiration();
                let total = inner.total_bytes as usize;
                inner.metrics.set_total_size(total);
                self.observers.read().dispatch(|o| o.on_expire(&key));
            }
        }
    }

    /// Fetch a value, bumping its recency. Returns `None` on a true miss
    /// or on an expired entry (which is removed as a side effect).
    pub fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.lock();
        let present_and_expired = match inner.store.peek(key) {
            Some(entry) => Some(entry.is_expired()),
            None => None,
        };

        match present_and_expired {
            None => {
                inner.metrics.record_miss();
                self.observers.read().dispatch(|o| o.on_miss(key));
                None
            }
            Some(true) => {
                let entry = inner.store.pop(key).expect("entry observed above");
                inner.total_bytes = inner.total_bytes.saturating_sub(entry.size_bytes as u64);
                inner.metrics.record_miss();
                inner.metrics.record_expiration();
                let total = inner.total_bytes as usize;
                inner.metrics.set_total_size(total);
                self.observers.read().dispatch(|o| o.on_expire(key));
                None
            }
            Some(false) => {
                let entry = inner.store.get_mut(key).expect("entry observed above");
                entry.touch();
                let value = entry.value().clone();
                inner.metrics.record_hit();
                self.observers.read().dispatch(|o| o.on_hit(key, &value));
                Some(value)
            }
        }
    }

    /// `get`, falling back to `default` instead of `None`.
    pub fn get_or(&self, key: &str, default: V) -> V {
        self.get(key).unwrap_or(default)
    }

    /// Insert or replace a value. `ttl = None` falls back to the cache's
    /// `default_ttl`.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let ttl = ttl.or(self.config.default_ttl);
        let size = (self.estimator)(&value);
        let entry = CacheEntry::new(value.clone(), ttl, size);

        let mut inner = self.inner.lock();
        if let Some(old) = inner.store.put(key.clone(), entry) {
            inner.total_bytes = inner.total_bytes.saturating_sub(old.size_bytes as u64);
        }
        inner.total_bytes += size as u64;
        inner.metrics.record_set();

        let evicted = self.evict_over_capacity(&mut inner);
        let total = inner.total_bytes as usize;
        inner.metrics.set_total_size(total);

        self.observers.read().dispatch(|o| o.on_set(&key, &value));
        for evicted_key in &evicted {
            self.observers.read().dispatch(|o| o.on_evict(evicted_key));
        }
    }

    fn evict_over_capacity(&self, inner: &mut Inner<V>) -> Vec<String> {
        let mut evicted = Vec::new();
        loop {
            let over_count = inner.store.len() > self.config.max_size;
            let over_bytes = self
                .config
                .max_memory_bytes
                .is_some_and(|bound| inner.total_bytes > bound);
            if !over_count && !over_bytes {
                break;
            }
            match inner.store.pop_lru() {
                Some((key, entry)) => {
                    inner.total_bytes = inner.total_bytes.saturating_sub(entry.size_bytes as u64);
                    inner.metrics.record_eviction();
                    evicted.push(key);
                }
                None => break,
            }
        }
        evicted
    }

    /// Remove a key, returning whether it was present.
    pub fn delete(&self, key: &str) -> bool {
        let mut inner = self.inner.lock();
        match inner.store.pop(key) {
            Some(entry) => {
                inner.total_bytes = inner.total_bytes.saturating_sub(entry.size_bytes as u64);
                inner.metrics.record_delete();
                let total = inner.total_bytes as usize;
                inner.metrics.set_total_size(total);
                self.observers.read().dispatch(|o| o.on_delete(key));
                true
            }
            None => false,
        }
    }

    /// Remove every entry. Cannot fail.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.store.clear();
        inner.total_bytes = 0;
        inner.metrics.set_total_size(0);
    }

    /// True if `key` is present and not expired, without bumping
    /// recency or firing observers.
    pub fn contains_key(&self, key: &str) -> bool {
        let inner = self.inner.lock();
        inner
            .store
            .peek(key)
            .is_some_and(|entry| !entry.is_expired())
    }

    /// Number of live entries, after purging anything expired.
    pub fn len(&self) -> usize {
        self.sweep_expired();
        self.inner.lock().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Aggregate byte size of all live entries.
    pub fn memory_usage(&self) -> u64 {
        self.sweep_expired();
        self.inner.lock().total_bytes
    }

    /// Snapshot of all non-expired keys, most-recently-used first.
    pub fn keys(&self) -> Vec<String> {
        self.sweep_expired();
        self.inner
            .lock()
            .store
            .iter()
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Snapshot of all non-expired values, most-recently-used first.
    pub fn values(&self) -> Vec<V> {
        self.sweep_expired();
        self.inner
            .lock()
            .store
            .iter()
            .map(|(_, entry)| entry.value().clone())
            .collect()
    }

    /// Snapshot of all non-expired (key, value) pairs, most-recently-used
    /// first.
    pub fn items(&self) -> Vec<(String, V)> {
        self.sweep_expired();
        self.inner
            .lock()
            .store
            .iter()
            .map(|(k, entry)| (k.clone(), entry.value().clone()))
            .collect()
    }

    /// Batched `get`.
    pub fn get_many(&self, keys: &[String]) -> HashMap<String, V> {
        keys.iter()
            .filter_map(|k| self.get(k).map(|v| (k.clone(), v)))
            .collect()
    }

    /// Batched `set`, all sharing the same TTL.
    pub fn set_many(&self, entries: impl IntoIterator<Item = (String, V)>, ttl: Option<Duration>) {
        for (key, value) in entries {
            self.set(key, value, ttl);
        }
    }

    /// Register an observer. Registration order is dispatch order.
    pub fn add_observer(&self, observer: Arc<dyn CacheObserver<V>>) {
        self.observers.write().register(observer);
    }

    /// Snapshot current metrics.
    pub fn metrics(&self) -> CacheMetrics {
        self.inner.lock().metrics.clone()
    }

    /// Serialize all non-expired entries to a self-describing blob.
    pub fn snapshot(&self) -> Result<String> {
        let inner = self.inner.lock();
        let records: Vec<SnapshotRecord<V>> = inner
            .store
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(key, entry)| SnapshotRecord {
                key: key.clone(),
                value: entry.value().clone(),
                created_at_ms: entry.created_at_ms,
                ttl_ms: entry.ttl_ms,
                access_count: entry.access_count,
            })
            .collect();
        snapshot::encode(&records)
    }

    /// Replace the cache's contents with a previously-taken snapshot,
    /// dropping any record that has since expired. Returns the number of
    /// records restored.
    pub fn restore(&self, blob: &str) -> Result<usize> {
        let records = snapshot::decode::<V>(blob)?;
        self.clear();
        let mut restored = 0;
        for record in records {
            if !record.is_live() {
                continue;
            }
            let ttl = record.ttl();
            self.set(record.key, record.value, ttl);
            restored += 1;
        }
        Ok(restored)
    }
}

impl<V> Drop for Cache<V> {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_cache(max_size: usize) -> Arc<Cache<String>> {
        Cache::new(CacheConfig::with_max_size(max_size))
    }

    #[test]
    fn capacity_scenario_from_spec() {
        let cache = small_cache(3);
        cache.set("a", "a".into(), None);
        cache.set("b", "b".into(), None);
        cache.set("c", "c".into(), None);
        cache.set("d", "d".into(), None);

        let mut keys = cache.keys();
        keys.sort();
        assert_eq!(keys, vec!["b", "c", "d"]);

        cache.get("b");
        cache.set("e", "e".into(), None);

        let mut keys = cache.keys();
        keys.sort();
        assert_eq!(keys, vec!["b", "d", "e"]);
    }

    #[test]
    fn ttl_scenario_from_spec() {
        let mut config = CacheConfig::with_max_size(10);
        config.default_ttl = Some(Duration::from_millis(100));
        let cache: Arc<Cache<String>> = Cache::new(config);

        cache.set("k", "v".into(), None);
        std::thread::sleep(Duration::from_millis(200));

        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.metrics().expirations, 1);
    }

    #[test]
    fn delete_missing_key_returns_false() {
        let cache = small_cache(3);
        assert!(!cache.delete("missing"));
    }

    #[test]
    fn memory_bound_evicts_oversized_entries() {
        let mut config = CacheConfig::with_max_size(100);
        config.max_memory_bytes = Some(16);
        let cache: Arc<Cache<String>> = Cache::new(config);

        cache.set("a", "aaaaaaaa".into(), None);
        cache.set("b", "bbbbbbbb".into(), None);
        cache.set("c", "cccccccc".into(), None);

        assert!(cache.memory_usage() <= 16);
    }

    #[test]
    fn snapshot_round_trip_preserves_live_entries() {
        let cache = small_cache(10);
        cache.set("a", "1".into(), None);
        cache.set("b", "2".into(), Some(Duration::from_secs(60)));

        let blob = cache.snapshot().unwrap();
        let restored = small_cache(10);
        let count = restored.restore(&blob).unwrap();

        assert_eq!(count, 2);
        assert_eq!(restored.get("a"), Some("1".to_string()));
        assert_eq!(restored.get("b"), Some("2".to_string()));
    }

    #[test]
    fn restore_drops_expired_records() {
        let cache = small_cache(10);
        cache.set("a", "1".into(), Some(Duration::from_millis(10)));
        std::thread::sleep(Duration::from_millis(60));
        let blob = cache.snapshot().unwrap();

        let restored = small_cache(10);
        let count = restored.restore(&blob).unwrap();
        assert_eq!(count, 0);
    }
}
