//! Cache entry type and expiration rules.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// A single cached value plus its bookkeeping metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    pub(crate) value: V,
    pub(crate) created_at_ms: u128,
    pub(crate) last_access_ms: u128,
    pub(crate) access_count: u64,
    pub(crate) ttl_ms: Option<u128>,
    pub(crate) size_bytes: usize,
}

impl<V> CacheEntry<V> {
    pub(crate) fn new(value: V, ttl: Option<Duration>, size_bytes: usize) -> Self {
        let now = now_millis();
        Self {
            value,
            created_at_ms: now,
            last_access_ms: now,
            access_count: 0,
            ttl_ms: ttl.map(|d| d.as_millis()),
            size_bytes,
        }
    }

    /// An entry is expired once `now > creation + ttl`. No TTL means it
    /// never expires.
    pub(crate) fn is_expired(&self) -> bool {
        match self.ttl_ms {
            Some(ttl) => now_millis() > self.created_at_ms + ttl,
            None => false,
        }
    }

    pub(crate) fn touch(&mut self) {
        self.last_access_ms = now_millis();
        self.access_count += 1;
    }

    pub(crate) fn age(&self) -> Duration {
        Duration::from_millis(now_millis().saturating_sub(self.created_at_ms) as u64)
    }

    pub(crate) fn ttl(&self) -> Option<Duration> {
        self.ttl_ms.map(|ms| Duration::from_millis(ms as u64))
    }

    /// Value accessor used by non-mutating snapshot operations
    /// (`keys`/`values`/`items`), which must not bump recency.
    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn access_count(&self) -> u64 {
        self.access_count
    }

    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }
}
