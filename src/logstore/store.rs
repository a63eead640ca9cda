//! The `LogStore` façade: ingest, query, range query, alert rules, and
//! stats, all behind a single `RwLock`, per the concurrency model's
//! single-writer-multiple-reader design for this core.

use chrono::Utc;
use parking_lot::RwLock;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::error;

use super::alerts::{self, Alert, AlertRule};
use super::entry::LogEntry;
use super::index::LogIndex;
use super::query::{self, LogFilter};
use super::stats::LogStats;

/// Runs before an entry is committed to the store. Returning `None` drops
/// the entry silently (e.g. a redaction or sampling hook).
pub trait PreIngestHook: Send + Sync {
    fn process(&self, entry: LogEntry) -> Option<LogEntry>;
}

/// Notified whenever an [`AlertRule`] fires.
pub trait AlertHook: Send + Sync {
    fn on_alert(&self, alert: &Alert);
}

struct Inner {
    master: Vec<Arc<LogEntry>>,
    index: LogIndex,
    rules: Vec<AlertRule>,
}

/// A multi-index, in-process log store with sliding-window alerting.
pub struct LogStore {
    inner: RwLock<Inner>,
    pre_ingest_hooks: RwLock<Vec<Arc<dyn PreIngestHook>>>,
    alert_hooks: RwLock<Vec<Arc<dyn AlertHook>>>,
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LogStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                master: Vec::new(),
                index: LogIndex::default(),
                rules: Vec::new(),
            }),
            pre_ingest_hooks: RwLock::new(Vec::new()),
            alert_hooks: RwLock::new(Vec::new()),
        }
    }

    pub fn add_pre_ingest_hook(&self, hook: Arc<dyn PreIngestHook>) {
        self.pre_ingest_hooks.write().push(hook);
    }

    pub fn add_alert_hook(&self, hook: Arc<dyn AlertHook>) {
        self.alert_hooks.write().push(hook);
    }

    pub fn add_rule(&self, rule: AlertRule) {
        self.inner.write().rules.push(rule);
    }

    /// Ingests one entry: runs pre-ingest hooks, indexes the survivor (if
    /// any), and evaluates every enabled alert rule against it.
    pub fn ingest(&self, entry: LogEntry) {
        let mut entry = Some(entry);
        for hook in self.pre_ingest_hooks.read().iter() {
            let Some(current) = entry.take() else { break };
            entry = match panic::catch_unwind(AssertUnwindSafe(|| hook.process(current))) {
                Ok(result) => result,
                Err(_) => {
                    error!("pre-ingest hook panicked, dropping entry");
                    None
                }
            };
        }
        let Some(entry) = entry else { return };

        let entry = Arc::new(entry);
        let fired = {
            let mut inner = self.inner.write();
            inner.master.push(entry.clone());
            inner.index.insert(&entry);

            let now = Utc::now();
            let master = inner.master.clone();
            let mut fired = Vec::new();
            for rule in inner.rules.iter_mut() {
                if let Some(alert) = alerts::evaluate(rule, &master, now) {
                    fired.push(alert);
                }
            }
            fired
        };

        for alert in &fired {
            self.dispatch_alert(alert);
        }
    }

    pub fn ingest_batch(&self, entries: impl IntoIterator<Item = LogEntry>) {
        for entry in entries {
            self.ingest(entry);
        }
    }

    fn dispatch_alert(&self, alert: &Alert) {
        for hook in self.alert_hooks.read().iter() {
            let hook = hook.clone();
            let alert = alert.clone();
            if panic::catch_unwind(AssertUnwindSafe(|| hook.on_alert(&alert))).is_err() {
                error!(rule = %alert.rule_name, "alert hook panicked");
            }
        }
    }

    pub fn query(&self, filter: &LogFilter) -> Vec<Arc<LogEntry>> {
        let inner = self.inner.read();
        query::execute(filter, &inner.master, &inner.index)
    }

    pub fn range_query(&self, start: &str, end: &str) -> Vec<Arc<LogEntry>> {
        self.inner.read().index.range_query(start, end)
    }

    pub fn len(&self) -> usize {
        self.inner.read().master.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> LogStats {
        let inner = self.inner.read();
        LogStats {
            total_entries: inner.master.len(),
            per_level: inner.index.level_counts(),
            per_source: inner.index.source_counts(),
            distinct_keywords: inner.index.distinct_keyword_count(),
            per_tag: inner.index.tag_counts(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logstore::alerts::AlertConditions;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn ingest_then_query_round_trips() {
        let store = LogStore::new();
        store.ingest(LogEntry::new("2026-01-01T00:00:00Z", "error", "disk failure").with_source("node-1"));
        let results = store.query(&LogFilter::new().with_level("error"));
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn pre_ingest_hook_can_drop_entries() {
        struct DropAll;
        impl PreIngestHook for DropAll {
            fn process(&self, _entry: LogEntry) -> Option<LogEntry> {
                None
            }
        }
        let store = LogStore::new();
        store.add_pre_ingest_hook(Arc::new(DropAll));
        store.ingest(LogEntry::new("2026-01-01T00:00:00Z", "info", "hello"));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn alert_fires_and_notifies_hook() {
        struct Counter(AtomicUsize);
        impl AlertHook for Counter {
            fn on_alert(&self, _alert: &Alert) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
        let store = LogStore::new();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        store.add_alert_hook(counter.clone());
        store.add_rule(AlertRule::new(
            "errors",
            AlertConditions {
                min_severity: Some(40),
                ..Default::default()
            },
            2,
            chrono::Duration::seconds(60),
        ));

        store.ingest(LogEntry::new(Utc::now().to_rfc3339(), "error", "a"));
        store.ingest(LogEntry::new(Utc::now().to_rfc3339(), "error", "b"));

        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }
}
