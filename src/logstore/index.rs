//! Time, level, source, keyword, and tag indexes over ingested entries.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::entry::LogEntry;

/// The secondary-index bundle maintained alongside the master log list.
#[derive(Default)]
pub(crate) struct LogIndex {
    time: BTreeMap<String, Vec<Arc<LogEntry>>>,
    by_level: HashMap<String, Vec<Arc<LogEntry>>>,
    by_source: HashMap<String, Vec<Arc<LogEntry>>>,
    by_keyword: HashMap<String, Vec<Arc<LogEntry>>>,
    by_tag: HashMap<String, Vec<Arc<LogEntry>>>,
}

impl LogIndex {
    pub(crate) fn insert(&mut self, entry: &Arc<LogEntry>) {
        self.time
            .entry(entry.timestamp.clone())
            .or_default()
            .push(entry.clone());

        self.by_level
            .entry(entry.level.clone())
            .or_default()
            .push(entry.clone());

        if let Some(source) = &entry.source {
            self.by_source.entry(source.clone()).or_default().push(entry.clone());
        }

        for token in entry.tokens() {
            self.by_keyword.entry(token).or_default().push(entry.clone());
        }

        for tag in &entry.tags {
            self.by_tag.entry(tag.clone()).or_default().push(entry.clone());
        }
    }

    /// All entries with a raw timestamp string in `[start, end]`,
    /// inclusive, in index order (chronological, given ISO-8601 keys).
    pub(crate) fn range_query(&self, start: &str, end: &str) -> Vec<Arc<LogEntry>> {
        self.time
            .range(start.to_string()..=end.to_string())
            .flat_map(|(_, entries)| entries.iter().cloned())
            .collect()
    }

    pub(crate) fn by_level(&self, level: &str) -> Vec<Arc<LogEntry>> {
        self.by_level.get(&level.to_uppercase()).cloned().unwrap_or_default()
    }

    pub(crate) fn by_source(&self, source: &str) -> Vec<Arc<LogEntry>> {
        self.by_source.get(source).cloned().unwrap_or_default()
    }

    pub(crate) fn by_tag(&self, tag: &str) -> Vec<Arc<LogEntry>> {
        self.by_tag.get(tag).cloned().unwrap_or_default()
    }

    pub(crate) fn distinct_keyword_count(&self) -> usize {
        self.by_keyword.len()
    }

    pub(crate) fn level_counts(&self) -> HashMap<String, usize> {
        self.by_level.iter().map(|(k, v)| (k.clone(), v.len())).collect()
    }

    pub(crate) fn source_counts(&self) -> HashMap<String, usize> {
        self.by_source.iter().map(|(k, v)| (k.clone(), v.len())).collect()
    }

    pub(crate) fn tag_counts(&self) -> HashMap<String, usize> {
        self.by_tag.iter().map(|(k, v)| (k.clone(), v.len())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ts: &str, level: &str, msg: &str) -> Arc<LogEntry> {
        Arc::new(LogEntry::new(ts, level, msg))
    }

    #[test]
    fn range_query_is_inclusive_and_chronological() {
        let mut index = LogIndex::default();
        index.insert(&entry("2026-01-01T00:00:00Z", "info", "a"));
        index.insert(&entry("2026-01-02T00:00:00Z", "info", "b"));
        index.insert(&entry("2026-01-03T00:00:00Z", "info", "c"));

        let result = index.range_query("2026-01-01T00:00:00Z", "2026-01-02T00:00:00Z");
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].message, "a");
        assert_eq!(result[1].message, "b");
    }

    #[test]
    fn single_point_range_query_finds_exact_match() {
        let mut index = LogIndex::default();
        let e = entry("2026-01-01T00:00:00Z", "info", "a");
        index.insert(&e);
        let result = index.range_query("2026-01-01T00:00:00Z", "2026-01-01T00:00:00Z");
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn keyword_index_is_case_insensitive() {
        let mut index = LogIndex::default();
        index.insert(&entry("2026-01-01T00:00:00Z", "info", "Disk Failure"));
        assert_eq!(index.by_keyword.get("disk").map(|v| v.len()), Some(1));
        assert_eq!(index.by_keyword.get("Disk"), None);
    }
}
