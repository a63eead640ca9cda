//! # Message Queue Core
//!
//! A generic, in-process message queue supporting FIFO, LIFO, priority,
//! and delay ordering disciplines, with at-least-once delivery via an
//! explicit ack/nack lifecycle, bounded retries, dead-lettering, optional
//! disk persistence, and an async consumer driver.
//!
//! ```
//! use corekit::queue::{MessageQueue, QueueConfig, QueueType, PublishOptions};
//!
//! let queue = MessageQueue::<String>::new(QueueConfig::new("jobs", QueueType::Fifo)).unwrap();
//! let id = queue.publish("do work".to_string(), PublishOptions::default()).unwrap();
//! let message = queue.consume("worker-1", 1).into_iter().next().unwrap();
//! assert_eq!(message.id, id);
//! queue.ack(&message.id).unwrap();
//! ```

mod config;
mod consumer;
mod containers;
mod error;
mod health;
mod message;
mod metrics;
mod persistence;
mod store;

pub use config::{QueueConfig, QueueType};
pub use consumer::{ConsumerDriver, MessageHandler};
pub use error::{QueueError, Result};
pub use health::{classify as queue_health, QueueHealth};
pub use message::{Message, MessageStatus, Priority, PublishOptions, DEFAULT_MAX_RETRIES};
pub use metrics::QueueMetrics;
pub use store::MessageQueue;
