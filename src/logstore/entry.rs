//! Log entry representation, tokenization, and severity scoring.
//!
//! Grounded in `enterprise::analytics::alerting`'s `AlertCondition`
//! matching idiom and `analytics::storage::TimeSeriesPoint`'s
//! timestamp-plus-metadata shape.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

static WORD_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9_]+").unwrap());

/// A single log record. `timestamp` is the raw, caller-supplied ISO-8601
/// string used as the time index key; `parsed_time` is the best-effort
/// parse used for range comparisons and alert windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub parsed_time: DateTime<Utc>,
    pub level: String,
    pub message: String,
    pub source: Option<String>,
    pub thread_id: Option<String>,
    pub request_id: Option<String>,
    pub user_id: Option<String>,
    pub tags: Vec<String>,
    pub metadata: HashMap<String, Value>,
}

impl LogEntry {
    /// Builds an entry from a raw timestamp string, normalizing `level`
    /// to upper-case. Falls back to `Utc::now()` if the timestamp cannot
    /// be parsed as RFC 3339, per the log core's best-effort contract.
    pub fn new(timestamp: impl Into<String>, level: impl Into<String>, message: impl Into<String>) -> Self {
        let timestamp = timestamp.into();
        let parsed_time = DateTime::parse_from_rfc3339(&timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());
        Self {
            timestamp,
            parsed_time,
            level: level.into().to_uppercase(),
            message: message.into(),
            source: None,
            thread_id: None,
            request_id: None,
            user_id: None,
            tags: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Lower-cased, whole-word tokens of `message`, for keyword indexing.
    pub(crate) fn tokens(&self) -> Vec<String> {
        WORD_BOUNDARY
            .find_iter(&self.message)
            .map(|m| m.as_str().to_lowercase())
            .collect()
    }

    /// Identity used for deduplication: `(timestamp, level, message, source)`.
    pub(crate) fn identity(&self) -> (&str, &str, &str, Option<&str>) {
        (&self.timestamp, &self.level, &self.message, self.source.as_deref())
    }

    pub fn severity(&self) -> u8 {
        severity_score(&self.level)
    }
}

/// `TRACE=0, DEBUG=10, INFO=20, WARN/WARNING=30, ERROR=40, FATAL/CRITICAL=50`;
/// unknown levels score as `INFO`.
pub fn severity_score(level: &str) -> u8 {
    match level.to_uppercase().as_str() {
        "TRACE" => 0,
        "DEBUG" => 10,
        "INFO" => 20,
        "WARN" | "WARNING" => 30,
        "ERROR" => 40,
        "FATAL" | "CRITICAL" => 50,
        _ => 20,
    }
}
