//! Queue-level counters and gauges, mirroring `scheduling::worker::WorkerHealth`'s
//! rolling-average approach to processing-time tracking.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::time::Duration;

const PROCESSING_TIME_WINDOW: usize = 1000;

/// Point-in-time and cumulative queue statistics.
#[derive(Debug, Clone)]
pub struct QueueMetrics {
    pub published: u64,
    pub consumed: u64,
    pub acked: u64,
    pub failed: u64,
    pub retried: u64,
    pub dead_lettered: u64,
    pub current_size: usize,
    pub in_flight: usize,
    pub dead_letter_size: usize,
    pub last_activity: Option<DateTime<Utc>>,
    processing_times: VecDeque<Duration>,
}

impl Default for QueueMetrics {
    fn default() -> Self {
        Self {
            published: 0,
            consumed: 0,
            acked: 0,
            failed: 0,
            retried: 0,
            dead_lettered: 0,
            current_size: 0,
            in_flight: 0,
            dead_letter_size: 0,
            last_activity: None,
            processing_times: VecDeque::with_capacity(PROCESSING_TIME_WINDOW),
        }
    }
}

impl QueueMetrics {
    pub(crate) fn record_publish(&mut self) {
        self.published += 1;
        self.last_activity = Some(Utc::now());
    }

    pub(crate) fn record_consume(&mut self) {
        self.consumed += 1;
        self.last_activity = Some(Utc::now());
    }

    pub(crate) fn record_ack(&mut self, processing_time: Duration) {
        self.acked += 1;
        if self.processing_times.len() == PROCESSING_TIME_WINDOW {
            self.processing_times.pop_front();
        }
        self.processing_times.push_back(processing_time);
    }

    pub(crate) fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub(crate) fn record_retry(&mut self) {
        self.retried += 1;
    }

    pub(crate) fn record_dead_letter(&mut self) {
        self.dead_lettered += 1;
    }

    /// Mean of the last (at most) 1000 recorded ack processing times.
    pub fn avg_processing_time(&self) -> Option<Duration> {
        if self.processing_times.is_empty() {
            return None;
        }
        let total: Duration = self.processing_times.iter().sum();
        Some(total / self.processing_times.len() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_metrics_report_no_average() {
        let metrics = QueueMetrics::default();
        assert_eq!(metrics.avg_processing_time(), None);
    }

    #[test]
    fn processing_window_caps_at_1000_samples() {
        let mut metrics = QueueMetrics::default();
        for _ in 0..1500 {
            metrics.record_ack(Duration::from_millis(10));
        }
        assert_eq!(metrics.processing_times.len(), PROCESSING_TIME_WINDOW);
        assert_eq!(metrics.avg_processing_time(), Some(Duration::from_millis(10)));
    }
}
