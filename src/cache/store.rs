//! Durable tier abstraction.
//!
//! A durable store is a flat string → string map shared by every cache
//! producer, so keys must be namespaced by the caller. Implementations do not
//! need to be transactional across keys.

use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a durable store.
///
/// The tiered cache never surfaces these; it logs them and degrades to
/// memory-only behavior for the affected operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Writing the item would exceed the store's byte quota.
    #[error("Durable store quota exceeded: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded {
        /// Bytes the store would hold after the write.
        needed: usize,
        /// Configured byte limit.
        limit: usize,
    },

    /// Reading or writing the backing file failed.
    #[error("Durable store I/O failure at {path:?}: {source}")]
    Io {
        /// File that could not be accessed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A record could not be serialized or parsed.
    #[error("Durable record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A record parsed but holds impossible values.
    #[error("Durable record is corrupt: {0}")]
    Corrupt(String),

    /// The store cannot be used right now.
    #[error("Durable store unavailable: {0}")]
    Unavailable(String),
}

/// Persistent key → string storage used as the cache's second tier.
pub trait DurableStore: Send {
    /// Read the raw value stored under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove_item(&mut self, key: &str) -> Result<(), StoreError>;

    /// All keys currently stored.
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Remove every key.
    fn clear(&mut self) -> Result<(), StoreError>;

    /// Remove every key starting with `prefix` and return the removed keys.
    ///
    /// Stops at the first failing removal; keys removed before the failure
    /// stay removed.
    fn remove_prefix(&mut self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let matching: Vec<String> = self
            .keys()?
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect();
        for key in &matching {
            self.remove_item(key)?;
        }
        Ok(matching)
    }
}

/// Bytes accounted against a quota for one item.
pub(crate) fn item_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

/// Check a pending write against an optional quota.
///
/// `current` is the usage before the write, `replaced` the size of the item
/// being overwritten (zero if new) and `added` the size of the new item.
pub(crate) fn check_quota(
    quota: Option<usize>,
    current: usize,
    replaced: usize,
    added: usize,
) -> Result<usize, StoreError> {
    let needed = current.saturating_sub(replaced).saturating_add(added);
    match quota {
        Some(limit) if needed > limit => Err(StoreError::QuotaExceeded { needed, limit }),
        _ => Ok(needed),
    }
}

/// In-process durable tier.
///
/// Holds nothing across restarts; used when persistence is disabled and to
/// model quota failures.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: BTreeMap<String, String>,
    quota: Option<usize>,
    used: usize,
}

impl MemoryStore {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes growing it past `limit` bytes.
    pub fn with_quota(limit: usize) -> Self {
        Self {
            quota: Some(limit),
            ..Self::default()
        }
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Bytes currently accounted against the quota.
    pub fn used_bytes(&self) -> usize {
        self.used
    }
}

impl DurableStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let replaced = self
            .items
            .get(key)
            .map(|old| item_size(key, old))
            .unwrap_or(0);
        self.used = check_quota(self.quota, self.used, replaced, item_size(key, &value))?;
        self.items.insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        if let Some(old) = self.items.remove(key) {
            self.used = self.used.saturating_sub(item_size(key, &old));
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.items.keys().cloned().collect())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.items.clear();
        self.used = 0;
        Ok(())
    }
}
