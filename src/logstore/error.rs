//! Log store error taxonomy. Kept small and symmetric with the cache and
//! queue cores' `thiserror` enums (`database::DatabaseError`,
//! `scheduling::queue::QueueError`) even though little in this core is
//! actually fallible.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogStoreError {
    /// A log entry's timestamp string could not be parsed; the entry was
    /// ingested with `Utc::now()` substituted.
    #[error("could not parse timestamp, substituted current time: {0}")]
    IntegrityWarning(String),
}

pub type Result<T> = std::result::Result<T, LogStoreError>;
