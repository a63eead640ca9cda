//! Observer hook registry for cache events.
//!
//! Runtime pluggable hooks are expressed as a fixed trait with no-op
//! defaults, following the `TaskHandler`/`NotificationDelivery`
//! trait-object registry idiom used for the queue's consumer handlers and
//! notification channels. Hooks run synchronously, after the mutation they
//! describe has already been committed, while the cache's exclusive lock
//! is still held — they must not call back into the same cache.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Callbacks fired after each cache mutation. All methods default to a
/// no-op so implementors only override the events they care about.
pub trait CacheObserver<V>: Send + Sync {
    fn on_hit(&self, _key: &str, _value: &V) {}
    fn on_miss(&self, _key: &str) {}
    fn on_set(&self, _key: &str, _value: &V) {}
    fn on_delete(&self, _key: &str) {}
    fn on_expire(&self, _key: &str) {}
    fn on_evict(&self, _key: &str) {}
}

/// Dispatches to every registered observer, catching and logging panics
/// so a faulty observer can never abort or poison the caller's operation.
pub(crate) struct ObserverRegistry<V> {
    observers: Vec<Arc<dyn CacheObserver<V>>>,
}

impl<V> Default for ObserverRegistry<V> {
    fn default() -> Self {
        Self {
            observers: Vec::new(),
        }
    }
}

impl<V> ObserverRegistry<V> {
    pub(crate) fn register(&mut self, observer: Arc<dyn CacheObserver<V>>) {
        self.observers.push(observer);
    }

    pub(crate) fn dispatch(&self, f: impl Fn(&dyn CacheObserver<V>)) {
        for observer in &self.observers {
            let observer = observer.as_ref();
            let result = panic::catch_unwind(AssertUnwindSafe(|| f(observer)));
            if let Err(payload) = result {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "observer panicked".to_string());
                tracing::error!(%message, "cache observer panicked; skipping");
            }
        }
    }
}
