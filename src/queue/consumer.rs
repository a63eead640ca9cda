//! Async consumer driver, grounded in `scheduling::worker::Worker::run_loop`'s
//! poll-dispatch-ack loop and `TaskHandler` trait.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use super::message::Message;
use super::store::MessageQueue;

/// Implemented by callers to process messages popped from a queue.
#[async_trait]
pub trait MessageHandler<P>: Send + Sync {
    async fn handle(&self, message: &Message<P>) -> std::result::Result<(), String>;
}

/// Polls a [`MessageQueue`] on an interval and dispatches ready messages
/// to a [`MessageHandler`], acking on success and nacking on failure.
pub struct ConsumerDriver<P> {
    queue: Arc<MessageQueue<P>>,
    handler: Arc<dyn MessageHandler<P>>,
    consumer_id: String,
    poll_interval: Duration,
    stop_flag: Arc<AtomicBool>,
}

impl<P> ConsumerDriver<P>
where
    P: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(
        queue: Arc<MessageQueue<P>>,
        handler: Arc<dyn MessageHandler<P>>,
        consumer_id: impl Into<String>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            queue,
            handler,
            consumer_id: consumer_id.into(),
            poll_interval,
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Requests that `run` return at the next poll boundary.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Drives the consume/handle/ack-or-nack loop until `stop` is called.
    /// Intended to be run inside a `tokio::spawn`.
    pub async fn run(&self) {
        info!(consumer = %self.consumer_id, queue = %self.queue.name(), "consumer driver started");
        let mut ticker = tokio::time::interval(self.poll_interval);
        loop {
            if self.stop_flag.load(Ordering::SeqCst) {
                break;
            }
            ticker.tick().await;

            let Some(message) = self.queue.consume(&self.consumer_id, 1).into_iter().next() else {
                continue;
            };

            match self.handler.handle(&message).await {
                Ok(()) => {
                    if let Err(err) = self.queue.ack(&message.id) {
                        error!(id = %message.id, error = %err, "failed to ack processed message");
                    }
                }
                Err(reason) => {
                    error!(id = %message.id, error = %reason, "handler reported failure");
                    if let Err(err) = self.queue.nack(&message.id, true) {
                        error!(id = %message.id, error = %err, "failed to nack failed message");
                    }
                }
            }
        }
        info!(consumer = %self.consumer_id, "consumer driver stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::config::{QueueConfig, QueueType};
    use crate::queue::message::PublishOptions;
    use std::sync::atomic::AtomicUsize;

    struct CountingHandler {
        handled: AtomicUsize,
        fail_first: AtomicBool,
    }

    #[async_trait]
    impl MessageHandler<String> for CountingHandler {
        async fn handle(&self, _message: &Message<String>) -> std::result::Result<(), String> {
            self.handled.fetch_add(1, Ordering::SeqCst);
            if self.fail_first.swap(false, Ordering::SeqCst) {
                return Err("simulated failure".to_string());
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn driver_retries_failed_message_then_acks() {
        let queue = Arc::new(MessageQueue::new(QueueConfig::new("t", QueueType::Fifo)).unwrap());
        queue
            .publish("payload".to_string(), PublishOptions::default())
            .unwrap();

        let handler = Arc::new(CountingHandler {
            handled: AtomicUsize::new(0),
            fail_first: AtomicBool::new(true),
        });
        let driver = ConsumerDriver::new(
            queue.clone(),
            handler.clone(),
            "worker-1",
            Duration::from_millis(5),
        );

        let stop_flag = driver.stop_flag.clone();
        let run = tokio::spawn(async move { driver.run().await });

        tokio::time::sleep(Duration::from_millis(60)).await;
        stop_flag.store(true, Ordering::SeqCst);
        run.await.unwrap();

        assert_eq!(handler.handled.load(Ordering::SeqCst), 2);
        assert_eq!(queue.in_flight_count(), 0);
    }
}
