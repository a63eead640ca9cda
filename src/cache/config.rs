//! Cache construction options.

use std::time::Duration;

/// Configuration accepted at cache construction time. Mirrors the
/// configuration surface a caller's config manager supplies; this crate
/// never reads configuration itself.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries. Must be greater than zero.
    pub max_size: usize,

    /// TTL applied to entries set without an explicit TTL.
    pub default_ttl: Option<Duration>,

    /// Whether hit/miss/eviction counters are maintained. Counters are
    /// cheap enough that disabling them only saves the lock acquisition
    /// on the metrics `RwLock`.
    pub enable_metrics: bool,

    /// Interval between sweeper wakeups. A zero interval disables the
    /// background sweeper; expired entries are still purged lazily on
    /// access.
    pub cleanup_interval: Duration,

    /// Optional aggregate byte-size bound across all entries.
    pub max_memory_bytes: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 1024,
            default_ttl: None,
            enable_metrics: true,
            cleanup_interval: Duration::from_secs(60),
            max_memory_bytes: None,
        }
    }
}

impl CacheConfig {
    /// Construct a config with the given entry bound and otherwise
    /// default settings.
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            max_size,
            ..Default::default()
        }
    }
}
