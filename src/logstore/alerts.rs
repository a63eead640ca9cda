//! Alert rules and sliding-window evaluation, grounded in
//! `enterprise::analytics::alerting`'s `AlertRule`/`AlertCondition`/
//! `Alert` shapes. `AlertConditions` is a typed struct rather than the
//! teacher's enum-of-variants or a stringly-typed map: every field here
//! is a fixed, known predicate, so a struct is the idiomatic Rust
//! rendering rather than a dynamically-keyed collection.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::entry::LogEntry;

/// A fixed-shape predicate evaluated against a single [`LogEntry`].
/// All populated fields must match for [`AlertConditions::matches`] to
/// return true.
#[derive(Debug, Clone, Default)]
pub struct AlertConditions {
    pub level: Option<String>,
    pub source: Option<String>,
    pub min_severity: Option<u8>,
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
}

impl AlertConditions {
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(level) = &self.level {
            if entry.level != level.to_uppercase() {
                return false;
            }
        }
        if let Some(source) = &self.source {
            if entry.source.as_deref() != Some(source.as_str()) {
                return false;
            }
        }
        if let Some(min_severity) = self.min_severity {
            if entry.severity() < min_severity {
                return false;
            }
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|tag| entry.tags.contains(tag)) {
            return false;
        }
        if !self.keywords.is_empty() {
            let message = entry.message.to_lowercase();
            if !self.keywords.iter().any(|kw| message.contains(&kw.to_lowercase())) {
                return false;
            }
        }
        true
    }
}

/// A standing rule evaluated on every ingest.
#[derive(Debug, Clone)]
pub struct AlertRule {
    pub name: String,
    pub conditions: AlertConditions,
    pub severity: String,
    pub threshold: usize,
    pub time_window: chrono::Duration,
    pub cooldown: chrono::Duration,
    pub enabled: bool,
    pub last_triggered: Option<DateTime<Utc>>,
}

impl AlertRule {
    pub fn new(name: impl Into<String>, conditions: AlertConditions, threshold: usize, time_window: chrono::Duration) -> Self {
        Self {
            name: name.into(),
            conditions,
            severity: "warning".to_string(),
            threshold,
            time_window,
            cooldown: chrono::Duration::seconds(60),
            enabled: true,
            last_triggered: None,
        }
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = severity.into();
        self
    }

    pub fn with_cooldown(mut self, cooldown: chrono::Duration) -> Self {
        self.cooldown = cooldown;
        self
    }
}

/// A fired alert: a snapshot of the rule that triggered and the matching
/// evidence at the time of evaluation.
#[derive(Debug, Clone)]
pub struct Alert {
    pub rule_name: String,
    pub message: String,
    pub severity: String,
    pub triggered_at: DateTime<Utc>,
    pub matched_count: usize,
    pub sample_entries: Vec<Arc<LogEntry>>,
}

const MAX_SAMPLES: usize = 5;

/// Evaluates `rule` against `master`, newest-first, stopping at the first
/// entry older than the rule's sliding window. Returns `Some(Alert)` and
/// advances `rule.last_triggered` if the rule fires.
pub(crate) fn evaluate(rule: &mut AlertRule, master: &[Arc<LogEntry>], now: DateTime<Utc>) -> Option<Alert> {
    if !rule.enabled {
        return None;
    }
    if let Some(last) = rule.last_triggered {
        if now - last < rule.cooldown {
            return None;
        }
    }

    let window_start = now - rule.time_window;
    let mut matched_newest_first = Vec::new();
    for entry in master.iter().rev() {
        if entry.parsed_time < window_start {
            break;
        }
        if rule.conditions.matches(entry) {
            matched_newest_first.push(entry.clone());
        }
    }

    if matched_newest_first.len() < rule.threshold {
        return None;
    }

    let mut samples: Vec<Arc<LogEntry>> = matched_newest_first.iter().take(MAX_SAMPLES).cloned().collect();
    samples.reverse();

    rule.last_triggered = Some(now);
    Some(Alert {
        rule_name: rule.name.clone(),
        message: format!(
            "rule '{}' matched {} entries in the last {}s",
            rule.name,
            matched_newest_first.len(),
            rule.time_window.num_seconds()
        ),
        severity: rule.severity.clone(),
        triggered_at: now,
        matched_count: matched_newest_first.len(),
        sample_entries: samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(msg: &str, when: DateTime<Utc>) -> Arc<LogEntry> {
        Arc::new(LogEntry::new(when.to_rfc3339(), "error", msg).with_source("svc"))
    }

    #[test]
    fn rule_fires_once_threshold_met_within_window() {
        let now = Utc::now();
        let master = vec![
            entry("boom", now - chrono::Duration::seconds(5)),
            entry("boom", now - chrono::Duration::seconds(3)),
            entry("boom", now - chrono::Duration::seconds(1)),
        ];
        let mut rule = AlertRule::new(
            "errors",
            AlertConditions {
                min_severity: Some(40),
                ..Default::default()
            },
            3,
            chrono::Duration::seconds(30),
        );

        let alert = evaluate(&mut rule, &master, now).unwrap();
        assert_eq!(alert.matched_count, 3);
        assert_eq!(alert.sample_entries.len(), 3);
        assert!(rule.last_triggered.is_some());
    }

    #[test]
    fn rule_respects_cooldown_after_firing() {
        let now = Utc::now();
        let master = vec![
            entry("boom", now - chrono::Duration::seconds(1)),
            entry("boom", now),
        ];
        let mut rule = AlertRule::new("errors", AlertConditions::default(), 2, chrono::Duration::seconds(30))
            .with_cooldown(chrono::Duration::seconds(120));
        rule.last_triggered = Some(now - chrono::Duration::seconds(10));

        assert!(evaluate(&mut rule, &master, now).is_none());
    }

    #[test]
    fn entries_outside_window_are_excluded() {
        let now = Utc::now();
        let master = vec![entry("boom", now - chrono::Duration::seconds(120))];
        let mut rule = AlertRule::new("errors", AlertConditions::default(), 1, chrono::Duration::seconds(30));
        assert!(evaluate(&mut rule, &master, now).is_none());
    }
}
