//! # LRU Cache Core
//!
//! A bounded, thread-safe key/value cache with LRU eviction, per-entry
//! time-to-live, a background expiry sweeper, pluggable event observers,
//! and textual snapshot/restore.
//!
//! ```
//! use corekit::cache::{Cache, CacheConfig};
//!
//! let cache = Cache::<String>::new(CacheConfig::with_max_size(100));
//! cache.set("greeting", "hello".to_string(), None);
//! assert_eq!(cache.get("greeting"), Some("hello".to_string()));
//! ```

mod config;
mod entry;
mod error;
mod metrics;
mod observer;
mod snapshot;
mod store;

pub use config::CacheConfig;
pub use entry::CacheEntry;
pub use error::{CacheError, Result};
pub use metrics::CacheMetrics;
pub use observer::CacheObserver;
pub use snapshot::SnapshotRecord;
pub use store::Cache;
