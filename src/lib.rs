//! # corekit - In-Process Backend Infrastructure Primitives
//!
//! Three independent, embeddable building blocks for backend services:
//!
//! - `cache`: a bounded, thread-safe LRU cache with TTL, eviction
//!   observers, a background expiry sweeper, and snapshot/restore.
//! - `queue`: a generic message queue (FIFO/LIFO/priority/delay) with
//!   at-least-once delivery, bounded retries, dead-lettering, optional
//!   disk persistence, and an async consumer driver.
//! - `logstore`: a multi-index, append-only log store with time-range,
//!   level, source, keyword, and tag queries, plus sliding-window alert
//!   rules.
//!
//! Each core is self-contained; there is no cross-core sharing.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod logstore;
pub mod queue;

/// Crate version, taken from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name, taken from `Cargo.toml`.
pub const NAME: &str = env!("CARGO_PKG_NAME");
