//! Background health classification, grounded in
//! `scheduling::monitor::MonitorStatus` and `scheduling::worker::WorkerHealth`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::debug;

use super::store::MessageQueue;
use serde::{de::DeserializeOwned, Serialize};

const HEALTH_TICK: Duration = Duration::from_secs(10);

/// Coarse health classification for a running queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueHealth {
    /// No backlog, in-flight count within normal bounds.
    Healthy,
    /// Empty queue, nothing to report.
    Idle,
    /// Backlog or in-flight count has crossed the configured watermark.
    Overloaded,
}

/// Classifies a queue's current state against a backlog watermark.
pub fn classify<P>(queue: &MessageQueue<P>, overload_watermark: usize) -> QueueHealth
where
    P: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    if queue.is_empty() && queue.in_flight_count() == 0 {
        return QueueHealth::Idle;
    }
    if queue.len() + queue.in_flight_count() >= overload_watermark {
        return QueueHealth::Overloaded;
    }
    QueueHealth::Healthy
}

/// Spawns a background task that logs a queue's health classification on
/// a fixed tick, self-terminating once the queue is dropped. Mirrors the
/// cache core's `Weak`-based sweeper self-check loop.
pub(crate) fn spawn_health_monitor<P>(
    queue: &Arc<MessageQueue<P>>,
    overload_watermark: usize,
    stop_flag: Arc<AtomicBool>,
) where
    P: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    if tokio::runtime::Handle::try_current().is_err() {
        return;
    }
    let weak: Weak<MessageQueue<P>> = Arc::downgrade(queue);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(HEALTH_TICK);
        loop {
            ticker.tick().await;
            if stop_flag.load(Ordering::SeqCst) {
                break;
            }
            let Some(queue) = weak.upgrade() else { break };
            let health = classify(&queue, overload_watermark);
            debug!(queue = %queue.name(), ?health, "queue health tick");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::config::{QueueConfig, QueueType};
    use crate::queue::message::PublishOptions;

    #[test]
    fn empty_queue_is_idle() {
        let queue = MessageQueue::<String>::new(QueueConfig::new("t", QueueType::Fifo)).unwrap();
        assert_eq!(classify(&queue, 10), QueueHealth::Idle);
    }

    #[test]
    fn backlog_past_watermark_is_overloaded() {
        let queue = MessageQueue::<String>::new(QueueConfig::new("t", QueueType::Fifo)).unwrap();
        for _ in 0..5 {
            queue
                .publish("x".to_string(), PublishOptions::default())
                .unwrap();
        }
        assert_eq!(classify(&queue, 5), QueueHealth::Overloaded);
    }

    #[test]
    fn below_watermark_backlog_is_healthy() {
        let queue = MessageQueue::<String>::new(QueueConfig::new("t", QueueType::Fifo)).unwrap();
        queue
            .publish("x".to_string(), PublishOptions::default())
            .unwrap();
        assert_eq!(classify(&queue, 10), QueueHealth::Healthy);
    }
}
