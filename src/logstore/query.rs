//! Conjunctive log queries.

use std::collections::HashSet;
use std::sync::Arc;

use super::entry::LogEntry;
use super::index::LogIndex;

/// A filter over the log store. All populated fields combine by
/// conjunction (AND). `start_time`/`end_time` only engage the time index
/// when both are present.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub level: Option<String>,
    pub source: Option<String>,
    pub keyword: Option<String>,
    pub tags: Vec<String>,
    pub min_severity: Option<u8>,
}

impl LogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_time = Some(start.into());
        self.end_time = Some(end.into());
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into().to_uppercase());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into().to_lowercase());
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    pub fn with_min_severity(mut self, min_severity: u8) -> Self {
        self.min_severity = Some(min_severity);
        self
    }
}

/// Executes a filter against the master list and indexes. The candidate
/// set narrows via the most selective available index first (time range,
/// then level/source/tag), then a linear scan applies the remaining
/// predicates (keyword substring, severity), so observable behavior is
/// always set intersection regardless of which index was consulted.
pub(crate) fn execute(filter: &LogFilter, master: &[Arc<LogEntry>], index: &LogIndex) -> Vec<Arc<LogEntry>> {
    let mut candidates: Vec<Arc<LogEntry>> = match (&filter.start_time, &filter.end_time) {
        (Some(start), Some(end)) => index.range_query(start, end),
        _ => master.to_vec(),
    };

    if let Some(level) = &filter.level {
        let allowed = index.by_level(level);
        let allowed_ptrs: HashSet<*const LogEntry> = allowed.iter().map(|e| Arc::as_ptr(e)).collect();
        candidates.retain(|e| allowed_ptrs.contains(&Arc::as_ptr(e)));
    }

    if let Some(source) = &filter.source {
        let allowed = index.by_source(source);
        let allowed_ptrs: HashSet<*const LogEntry> = allowed.iter().map(|e| Arc::as_ptr(e)).collect();
        candidates.retain(|e| allowed_ptrs.contains(&Arc::as_ptr(e)));
    }

    if !filter.tags.is_empty() {
        candidates.retain(|e| filter.tags.iter().any(|tag| e.tags.contains(tag)));
    }

    if let Some(keyword) = &filter.keyword {
        candidates.retain(|e| e.message.to_lowercase().contains(keyword.as_str()));
    }

    if let Some(min_severity) = filter.min_severity {
        candidates.retain(|e| e.severity() >= min_severity);
    }

    candidates
}
