//! File-backed durable tier.
//!
//! The whole store is a single JSON object `{key: value}` kept in memory and
//! rewritten on every mutation. Writes go to a sibling temp file which is then
//! renamed over the original, so a crash mid-write leaves the previous
//! contents intact.

use super::store::{check_quota, item_size, DurableStore, StoreError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Durable store persisted to a JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    items: BTreeMap<String, String>,
    quota: Option<usize>,
    used: usize,
}

impl FileStore {
    /// Open (or create) the store at `path`.
    ///
    /// A file that exists but does not parse is discarded with a warning: a
    /// corrupt cache should never block startup.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] if the parent directory cannot be created or
    /// an existing file cannot be read.
    pub fn open(path: impl Into<PathBuf>, quota: Option<usize>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let items = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            match serde_json::from_str::<BTreeMap<String, String>>(&contents) {
                Ok(items) => items,
                Err(err) => {
                    warn!(path = ?path, error = %err, "Discarding unreadable cache store");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        let used = items.iter().map(|(k, v)| item_size(k, v)).sum();
        debug!(path = ?path, entries = items.len(), used, "Opened file store");

        Ok(Self {
            path,
            items,
            quota,
            used,
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes currently accounted against the quota.
    pub fn used_bytes(&self) -> usize {
        self.used
    }

    fn persist(&self) -> Result<(), StoreError> {
        let contents = serde_json::to_string(&self.items)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, contents).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn recompute_usage(&mut self) {
        self.used = self.items.iter().map(|(k, v)| item_size(k, v)).sum();
    }
}

impl DurableStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let replaced = self
            .items
            .get(key)
            .map(|old| item_size(key, old))
            .unwrap_or(0);
        let needed = check_quota(self.quota, self.used, replaced, item_size(key, &value))?;

        let previous = self.items.insert(key.to_string(), value);
        if let Err(err) = self.persist() {
            match previous {
                Some(old) => self.items.insert(key.to_string(), old),
                None => self.items.remove(key),
            };
            return Err(err);
        }
        self.used = needed;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        let Some(old) = self.items.remove(key) else {
            return Ok(());
        };
        if let Err(err) = self.persist() {
            self.items.insert(key.to_string(), old);
            return Err(err);
        }
        self.used = self.used.saturating_sub(item_size(key, &old));
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.items.keys().cloned().collect())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        let previous = std::mem::take(&mut self.items);
        if let Err(err) = self.persist() {
            self.items = previous;
            return Err(err);
        }
        self.used = 0;
        Ok(())
    }

    fn remove_prefix(&mut self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let previous = self.items.clone();
        let removed: Vec<String> = self
            .items
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        if removed.is_empty() {
            return Ok(removed);
        }
        self.items.retain(|key, _| !key.starts_with(prefix));
        if let Err(err) = self.persist() {
            self.items = previous;
            return Err(err);
        }
        self.recompute_usage();
        Ok(removed)
    }
}
