//! Cache error taxonomy.

use thiserror::Error;

/// Errors surfaced by the cache core. Most cache operations are
/// infallible by design (`get` returns `None`, `delete` returns `false`);
/// the only failure mode a caller must handle is a malformed snapshot.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("snapshot serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, CacheError>;
