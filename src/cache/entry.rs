//! Cache entries and their durable record encoding.

use super::store::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Default time-to-live applied when a caller does not pass one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// A cached payload with its expiration window.
///
/// # Invariants
/// - `stored_at` never changes after construction
/// - The entry is valid iff `now - stored_at <= ttl`
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    payload: Arc<Value>,
    stored_at: DateTime<Utc>,
    ttl: Duration,
}

impl CacheEntry {
    /// Create an entry stored at `stored_at`.
    pub fn new(payload: Value, stored_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            payload: Arc::new(payload),
            stored_at,
            ttl,
        }
    }

    /// Shared handle to the payload.
    pub fn payload(&self) -> &Arc<Value> {
        &self.payload
    }

    /// Creation time.
    pub fn stored_at(&self) -> DateTime<Utc> {
        self.stored_at
    }

    /// Expiration window.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether the entry may still be served at `now`.
    ///
    /// A clock that went backwards counts as zero elapsed time.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let elapsed = (now - self.stored_at).to_std().unwrap_or(Duration::ZERO);
        elapsed <= self.ttl
    }

    /// Encode as the JSON string kept in the durable tier.
    pub fn encode(&self) -> Result<String, StoreError> {
        let record = RecordRef {
            data: &self.payload,
            timestamp: self.stored_at.timestamp_millis(),
            expiration: ttl_millis(self.ttl),
        };
        Ok(serde_json::to_string(&record)?)
    }

    /// Decode a durable-tier string back into an entry.
    pub fn decode(raw: &str) -> Result<Self, StoreError> {
        let record: DurableRecord = serde_json::from_str(raw)?;
        record.into_entry()
    }
}

/// Durable-tier wire format: `{"data": .., "timestamp": .., "expiration": ..}`.
///
/// `timestamp` is the creation time in epoch milliseconds and `expiration`
/// the TTL in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurableRecord {
    /// Cached payload.
    pub data: Value,
    /// Creation time, epoch milliseconds.
    pub timestamp: i64,
    /// Time-to-live, milliseconds.
    pub expiration: u64,
}

impl DurableRecord {
    /// Convert into an in-memory entry.
    pub fn into_entry(self) -> Result<CacheEntry, StoreError> {
        let stored_at = DateTime::<Utc>::from_timestamp_millis(self.timestamp).ok_or_else(|| {
            StoreError::Corrupt(format!("timestamp out of range: {}", self.timestamp))
        })?;
        Ok(CacheEntry::new(
            self.data,
            stored_at,
            Duration::from_millis(self.expiration),
        ))
    }
}

#[derive(Serialize)]
struct RecordRef<'a> {
    data: &'a Value,
    timestamp: i64,
    expiration: u64,
}

fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
}
