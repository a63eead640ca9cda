//! Cache hit/miss/eviction counters.
//!
//! Mirrors the `CacheStats` shape in `database::cache`, scoped to the
//! fields the distilled spec actually asks for.

/// Monotonically non-decreasing cache counters, plus the current and
/// peak aggregate size.
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub total_size: usize,
    pub peak_size: usize,
}

impl CacheMetrics {
    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_set(&mut self) {
        self.sets += 1;
    }

    pub(crate) fn record_delete(&mut self) {
        self.deletes += 1;
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub(crate) fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    pub(crate) fn set_total_size(&mut self, size: usize) {
        self.total_size = size;
        if size > self.peak_size {
            self.peak_size = size;
        }
    }

    /// Ratio of hits to total lookups, `0.0` when there have been none.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
