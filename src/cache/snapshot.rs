//! Textual snapshot encoding for `Cache::snapshot`/`Cache::restore`.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::error::{CacheError, Result};

/// One entry in a cache snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRecord<V> {
    pub key: String,
    pub value: V,
    pub created_at_ms: u128,
    pub ttl_ms: Option<u128>,
    pub access_count: u64,
}

impl<V> SnapshotRecord<V> {
    /// A record is still eligible for restoration once `creation + ttl >=
    /// now`; expired records are dropped by the caller.
    pub(crate) fn is_live(&self) -> bool {
        match self.ttl_ms {
            None => true,
            Some(ttl) => {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_millis();
                self.created_at_ms + ttl >= now
            }
        }
    }

    pub(crate) fn ttl(&self) -> Option<Duration> {
        self.ttl_ms.map(|ms| Duration::from_millis(ms as u64))
    }
}

pub(crate) fn encode<V: Serialize>(records: &[SnapshotRecord<V>]) -> Result<String> {
    serde_json::to_string(records).map_err(|e| CacheError::Serialization(e.to_string()))
}

pub(crate) fn decode<V: DeserializeOwned>(blob: &str) -> Result<Vec<SnapshotRecord<V>>> {
    serde_json::from_str(blob).map_err(|e| CacheError::Serialization(e.to_string()))
}
