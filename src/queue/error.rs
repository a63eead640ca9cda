//! Message queue error taxonomy.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("queue is at capacity ({0})")]
    Capacity(String),

    #[error("message not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("handler error: {0}")]
    HandlerError(String),
}

pub type Result<T> = std::result::Result<T, QueueError>;
