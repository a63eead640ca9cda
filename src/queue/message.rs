//! Message type, priority, and status.
//!
//! Mirrors the shape of `scheduling::queue::QueuedJob`, generalized from a
//! job-execution record to an opaque-payload queue message.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Message priority. Ordinal order is the delivery order for the
/// `Priority` queue variant: `Urgent > High > Normal > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low = 0,
    Normal = 1,
    High = 2,
    Urgent = 3,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

/// Lifecycle status of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    DeadLetter,
}

/// A queued unit of work with an opaque, generic payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message<P> {
    pub id: String,
    pub payload: P,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub retry_count: u32,
    pub max_retries: u32,
    pub delay_until: Option<DateTime<Utc>>,
    pub headers: HashMap<String, String>,
    pub status: MessageStatus,
    pub consumer_id: Option<String>,
}

/// Options accepted by [`crate::queue::MessageQueue::publish`].
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    pub id: Option<String>,
    pub priority: Priority,
    pub delay: Option<chrono::Duration>,
    pub headers: HashMap<String, String>,
    pub max_retries: Option<u32>,
}

/// A message's default retry budget, per the distilled spec's
/// `max_retries` default.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

impl<P> Message<P> {
    pub(crate) fn new(payload: P, options: PublishOptions) -> Self {
        let now = Utc::now();
        Self {
            id: options.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            payload,
            priority: options.priority,
            created_at: now,
            processed_at: None,
            retry_count: 0,
            max_retries: options.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            delay_until: options.delay.map(|d| now + d),
            headers: options.headers,
            status: MessageStatus::Pending,
            consumer_id: None,
        }
    }

    pub(crate) fn is_ready(&self, now: DateTime<Utc>) -> bool {
        self.delay_until.map_or(true, |delay| delay <= now)
    }
}

impl<P> Message<P>
where
    P: Serialize + DeserializeOwned,
{
    pub(crate) fn encode(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap_or_default()
    }

    pub(crate) fn decode(bytes: &[u8]) -> Option<Self> {
        bincode::deserialize(bytes).ok()
    }
}
