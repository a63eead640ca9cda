//! Message queue construction options.

use std::path::PathBuf;

/// Ordering discipline for a queue's pending container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueType {
    Fifo,
    Lifo,
    Priority,
    Delay,
}

/// Configuration accepted at queue construction time.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub name: String,
    pub queue_type: QueueType,
    pub maxsize: Option<usize>,
    pub enable_persistence: bool,
    pub storage_path: Option<PathBuf>,
    pub enable_dead_letter: bool,
    pub dead_letter_maxsize: usize,
}

impl QueueConfig {
    pub fn new(name: impl Into<String>, queue_type: QueueType) -> Self {
        Self {
            name: name.into(),
            queue_type,
            maxsize: None,
            enable_persistence: false,
            storage_path: None,
            enable_dead_letter: true,
            dead_letter_maxsize: 1000,
        }
    }

    pub fn with_maxsize(mut self, maxsize: usize) -> Self {
        self.maxsize = Some(maxsize);
        self
    }

    pub fn with_persistence(mut self, storage_path: impl Into<PathBuf>) -> Self {
        self.enable_persistence = true;
        self.storage_path = Some(storage_path.into());
        self
    }

    pub fn without_dead_letter(mut self) -> Self {
        self.enable_dead_letter = false;
        self
    }
}
