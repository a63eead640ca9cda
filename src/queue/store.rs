//! The `MessageQueue` façade: publish, consume, ack/nack, retries, and
//! dead-lettering. The ack/nack/retry lifecycle is grounded in
//! `scheduling::queue::JobQueue`'s `complete_job`/`fail_job`/
//! `move_to_dead_letter` trio, generalized from a Redis-backed job queue
//! to an in-process, optionally disk-persisted message queue.

use chrono::Utc;
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

use super::config::{QueueConfig, QueueType};
use super::containers::PendingContainer;
use super::error::{QueueError, Result};
use super::health;
use super::message::{Message, MessageStatus, PublishOptions};
use super::metrics::QueueMetrics;
use super::persistence::PersistenceLayer;

struct InFlight<P> {
    message: Message<P>,
    dispatched_at: Instant,
}

struct Inner<P> {
    pending: PendingContainer<P>,
    in_flight: HashMap<String, InFlight<P>>,
}

/// A bounded, optionally persisted, optionally dead-lettering message
/// queue over an opaque payload type `P`.
pub struct MessageQueue<P> {
    config: QueueConfig,
    inner: Mutex<Inner<P>>,
    metrics: Mutex<QueueMetrics>,
    dead_letters: Mutex<VecDeque<Message<P>>>,
    persistence: Option<PersistenceLayer>,
    stop_flag: Arc<AtomicBool>,
}

impl<P> MessageQueue<P>
where
    P: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(config: QueueConfig) -> Result<Self> {
        let persistence = if config.enable_persistence {
            let path = config
                .storage_path
                .as_deref()
                .ok_or_else(|| QueueError::Capacity("persistence enabled without storage_path".into()))?;
            Some(PersistenceLayer::new(path, &config.name)?)
        } else {
            None
        };

        let pending = match config.queue_type {
            QueueType::Fifo => PendingContainer::Fifo(VecDeque::new()),
            QueueType::Lifo => PendingContainer::Lifo(VecDeque::new()),
            QueueType::Priority => PendingContainer::Priority(std::collections::BinaryHeap::new()),
            QueueType::Delay => PendingContainer::Delay(std::collections::BinaryHeap::new()),
        };

        let mut queue = Self {
            config,
            inner: Mutex::new(Inner {
                pending,
                in_flight: HashMap::new(),
            }),
            metrics: Mutex::new(QueueMetrics::default()),
            dead_letters: Mutex::new(VecDeque::new()),
            persistence,
            stop_flag: Arc::new(AtomicBool::new(false)),
        };
        queue.rehydrate()?;
        Ok(queue)
    }

    /// Spawns a background task that periodically classifies and logs
    /// this queue's health. A no-op outside a running Tokio runtime.
    pub fn start_health_monitor(self: &Arc<Self>, overload_watermark: usize) {
        health::spawn_health_monitor(self, overload_watermark, self.stop_flag.clone());
    }

    /// Loads persisted messages back into the pending container.
    /// `Processing` records — messages that were in flight when the
    /// process last stopped without a clean `shutdown()` — are
    /// redelivered with their retry budget advanced by one, since a
    /// consumer may have already partially handled them.
    fn rehydrate(&mut self) -> Result<()> {
        let Some(persistence) = &self.persistence else {
            return Ok(());
        };
        let messages: Vec<Message<P>> = persistence.load_all()?;
        if messages.is_empty() {
            return Ok(());
        }
        debug!(queue = %self.config.name, count = messages.len(), "rehydrated persisted messages");
        let inner = self.inner.get_mut();
        for mut message in messages {
            if message.status == MessageStatus::Processing {
                message.retry_count += 1;
                message.status = MessageStatus::Pending;
                message.consumer_id = None;
            }
            inner.pending.push(message);
        }
        Ok(())
    }

    /// Enqueues a new message and returns its id.
    pub fn publish(&self, payload: P, options: PublishOptions) -> Result<String> {
        let message = Message::new(payload, options);
        let id = message.id.clone();

        if let Some(maxsize) = self.config.maxsize {
            let inner = self.inner.lock();
            if inner.pending.len() >= maxsize {
                return Err(QueueError::Capacity(format!(
                    "queue '{}' is at its configured maximum of {maxsize}",
                    self.config.name
                )));
            }
        }

        if let Some(persistence) = &self.persistence {
            persistence.persist(&message)?;
        }

        self.inner.lock().pending.push(message);
        self.metrics.lock().record_publish();
        Ok(id)
    }

    /// Pops up to `batch_size` deliverable messages in one lock
    /// acquisition and marks each in-flight under `consumer_id`. Returns
    /// an empty `Vec` if nothing is ready right now.
    pub fn consume(&self, consumer_id: &str, batch_size: usize) -> Vec<Message<P>> {
        let now = Utc::now();
        let mut messages = Vec::with_capacity(batch_size);
        {
            let mut inner = self.inner.lock();
            for _ in 0..batch_size {
                let Some(mut message) = inner.pending.pop_ready(now) else {
                    break;
                };
                message.status = MessageStatus::Processing;
                message.processed_at = Some(now);
                message.consumer_id = Some(consumer_id.to_string());
                inner.in_flight.insert(
                    message.id.clone(),
                    InFlight {
                        message: message.clone(),
                        dispatched_at: Instant::now(),
                    },
                );
                messages.push(message);
            }
        }

        if messages.is_empty() {
            return messages;
        }

        let mut metrics = self.metrics.lock();
        for _ in &messages {
            metrics.record_consume();
        }
        drop(metrics);

        if let Some(persistence) = &self.persistence {
            for message in &messages {
                if let Err(err) = persistence.persist(message) {
                    error!(id = %message.id, error = %err, "failed to persist in-flight status transition");
                }
            }
        }

        messages
    }

    /// Acknowledges successful processing of an in-flight message.
    pub fn ack(&self, id: &str) -> Result<()> {
        let entry = self
            .inner
            .lock()
            .in_flight
            .remove(id)
            .ok_or_else(|| QueueError::NotFound(id.to_string()))?;

        if let Some(persistence) = &self.persistence {
            persistence.remove(id)?;
        }
        self.metrics.lock().record_ack(entry.dispatched_at.elapsed());
        Ok(())
    }

    /// Reports failed processing of an in-flight message. When `requeue`
    /// is true and the retry budget allows it, the message goes back to
    /// the pending container for another attempt; otherwise (budget
    /// exhausted, or `requeue = false` for a message the caller knows is
    /// unrecoverable) it is routed straight to the dead-letter buffer, or
    /// marked `Failed` if dead-lettering is disabled.
    pub fn nack(&self, id: &str, requeue: bool) -> Result<()> {
        let entry = self
            .inner
            .lock()
            .in_flight
            .remove(id)
            .ok_or_else(|| QueueError::NotFound(id.to_string()))?;

        let mut message = entry.message;
        message.retry_count += 1;
        message.consumer_id = None;

        if requeue && message.retry_count <= message.max_retries {
            message.status = MessageStatus::Pending;
            self.metrics.lock().record_retry();
            if let Some(persistence) = &self.persistence {
                persistence.persist(&message)?;
            }
            self.inner.lock().pending.push(message);
            return Ok(());
        }

        message.processed_at = Some(Utc::now());
        self.metrics.lock().record_failure();

        if self.config.enable_dead_letter {
            message.status = MessageStatus::DeadLetter;
            warn!(
                queue = %self.config.name,
                id = %message.id,
                retries = message.retry_count,
                requeue,
                "message routed to dead letter"
            );
            if let Some(persistence) = &self.persistence {
                persistence.move_to_dead_letter(&message)?;
            }
            let mut dead_letters = self.dead_letters.lock();
            if dead_letters.len() >= self.config.dead_letter_maxsize {
                dead_letters.pop_front();
            }
            dead_letters.push_back(message);
            self.metrics.lock().record_dead_letter();
        } else {
            message.status = MessageStatus::Failed;
            warn!(
                queue = %self.config.name,
                id = %message.id,
                retries = message.retry_count,
                requeue,
                "message failed, dead-lettering disabled"
            );
            if let Some(persistence) = &self.persistence {
                persistence.remove(&message.id)?;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn in_flight_count(&self) -> usize {
        self.inner.lock().in_flight.len()
    }

    pub fn dead_letter_messages(&self) -> Vec<Message<P>> {
        self.dead_letters.lock().iter().cloned().collect()
    }

    pub fn metrics(&self) -> QueueMetrics {
        let mut metrics = self.metrics.lock().clone();
        metrics.current_size = self.len();
        metrics.in_flight = self.in_flight_count();
        metrics.dead_letter_size = self.dead_letters.lock().len();
        metrics
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Stops background workers and flushes in-flight messages back to
    /// `Pending` so a later restart (via `new`'s rehydrate) recovers them
    /// rather than losing work in progress.
    pub fn shutdown(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);

        let mut inner = self.inner.lock();
        let in_flight: Vec<Message<P>> = inner
            .in_flight
            .drain()
            .map(|(_, entry)| entry.message)
            .collect();

        for mut message in in_flight {
            message.status = MessageStatus::Pending;
            message.consumer_id = None;
            if let Some(persistence) = &self.persistence {
                if let Err(err) = persistence.persist(&message) {
                    error!(id = %message.id, error = %err, "failed to re-persist in-flight message on shutdown");
                }
            }
            inner.pending.push(message);
        }
    }
}

impl<P> Drop for MessageQueue<P> {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(queue_type: QueueType) -> MessageQueue<String> {
        MessageQueue::new(QueueConfig::new("test", queue_type)).unwrap()
    }

    #[test]
    fn publish_then_consume_round_trips_payload() {
        let q = queue(QueueType::Fifo);
        q.publish("hello".to_string(), PublishOptions::default()).unwrap();
        let msg = q.consume("worker-1", 1).into_iter().next().unwrap();
        assert_eq!(msg.payload, "hello");
        assert_eq!(q.in_flight_count(), 1);
    }

    #[test]
    fn consume_respects_batch_size_in_one_lock_acquisition() {
        let q = queue(QueueType::Fifo);
        for i in 0..5 {
            q.publish(format!("job-{i}"), PublishOptions::default()).unwrap();
        }
        let batch = q.consume("worker-1", 3);
        assert_eq!(batch.len(), 3);
        assert_eq!(q.len(), 2);
        assert_eq!(q.in_flight_count(), 3);
    }

    #[test]
    fn consume_returns_empty_vec_when_nothing_ready() {
        let q = queue(QueueType::Fifo);
        assert!(q.consume("worker-1", 5).is_empty());
    }

    #[test]
    fn ack_clears_in_flight_entry() {
        let q = queue(QueueType::Fifo);
        let id = q.publish("a".to_string(), PublishOptions::default()).unwrap();
        q.consume("worker-1", 1);
        q.ack(&id).unwrap();
        assert_eq!(q.in_flight_count(), 0);
    }

    #[test]
    fn nack_requeues_until_retry_budget_exhausted_then_dead_letters() {
        let mut options = PublishOptions::default();
        options.max_retries = Some(1);
        let q = queue(QueueType::Fifo);
        q.publish("a".to_string(), options).unwrap();

        let first = q.consume("worker-1", 1).into_iter().next().unwrap();
        q.nack(&first.id, true).unwrap();
        assert_eq!(q.len(), 1);

        let second = q.consume("worker-1", 1).into_iter().next().unwrap();
        q.nack(&second.id, true).unwrap();
        assert_eq!(q.len(), 0);
        assert_eq!(q.dead_letter_messages().len(), 1);
    }

    #[test]
    fn nack_without_requeue_dead_letters_immediately_despite_retry_budget() {
        let q = queue(QueueType::Fifo);
        q.publish("poison".to_string(), PublishOptions::default()).unwrap();

        let message = q.consume("worker-1", 1).into_iter().next().unwrap();
        q.nack(&message.id, false).unwrap();

        assert_eq!(q.len(), 0);
        assert_eq!(q.dead_letter_messages().len(), 1);
    }

    #[test]
    fn shutdown_flushes_in_flight_messages_back_to_pending() {
        let q = queue(QueueType::Fifo);
        q.publish("a".to_string(), PublishOptions::default()).unwrap();
        let message = q.consume("worker-1", 1).into_iter().next().unwrap();
        assert_eq!(q.in_flight_count(), 1);

        q.shutdown();

        assert_eq!(q.in_flight_count(), 0);
        assert_eq!(q.len(), 1);
        let requeued = q.consume("worker-2", 1).into_iter().next().unwrap();
        assert_eq!(requeued.id, message.id);
        assert_eq!(requeued.status, MessageStatus::Processing);
    }

    #[test]
    fn publish_rejects_beyond_configured_maxsize() {
        let q = MessageQueue::new(QueueConfig::new("bounded", QueueType::Fifo).with_maxsize(1)).unwrap();
        q.publish("a".to_string(), PublishOptions::default()).unwrap();
        let err = q.publish("b".to_string(), PublishOptions::default());
        assert!(err.is_err());
    }

    #[test]
    fn ack_unknown_id_returns_not_found() {
        let q = queue(QueueType::Fifo);
        assert!(matches!(q.ack("missing"), Err(QueueError::NotFound(_))));
    }
}
