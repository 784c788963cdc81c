//! Dataset input.
//!
//! A dataset is a JSON file holding an array of objects. Loads go through the
//! [`TieredCache`] under the [`DATASET_NAMESPACE`] namespace, so reopening a
//! file within the TTL serves the cached copy instead of re-reading it. The
//! file read stands in for what a dashboard would fetch over the network.

use crate::cache::{cache_key, namespace_prefix, TieredCache};
use crate::model::error::InputError;
use crate::model::Record;
use crate::view_state::{CellValue, Column, Columns};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Cache namespace for dataset payloads.
pub const DATASET_NAMESPACE: &str = "dataset";

/// Parameters identifying one dataset load.
#[derive(Debug, Serialize)]
struct DatasetQuery<'a> {
    path: &'a str,
}

/// A dataset file and the cache key it loads under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSource {
    path: PathBuf,
    key: String,
}

impl DatasetSource {
    /// Resolve `path` and derive its cache key.
    ///
    /// The path is canonicalized so different spellings of the same file
    /// share one cache entry.
    ///
    /// # Errors
    ///
    /// Returns `InputError::FileNotFound` if the file does not exist.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let given = path.as_ref();
        let path = std::fs::canonicalize(given).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => InputError::FileNotFound {
                path: given.to_path_buf(),
            },
            _ => InputError::Io(err),
        })?;
        let key = cache_key(
            DATASET_NAMESPACE,
            &DatasetQuery {
                path: &path.to_string_lossy(),
            },
        )?;
        Ok(Self { path, key })
    }

    /// Canonical path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cache key for this file.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Return the records, from the cache when a valid copy exists.
    ///
    /// # Errors
    ///
    /// Read and decode failures are returned and leave the cache untouched.
    pub fn load(&self, cache: &TieredCache) -> Result<Vec<Record>, InputError> {
        let records = cache.get_or_set(&self.key, || {
            debug!(path = %self.path.display(), "Dataset not cached, reading file");
            read_records(&self.path)
        })?;
        info!(
            path = %self.path.display(),
            records = records.len(),
            "Dataset loaded"
        );
        Ok(records)
    }

    /// Drop the cached copy and read the file again.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load). On failure the cached copy stays dropped.
    pub fn reload(&self, cache: &TieredCache) -> Result<Vec<Record>, InputError> {
        cache.delete(&self.key);
        self.load(cache)
    }
}

/// Drop every cached dataset. Returns the number of entries removed.
pub fn invalidate_datasets(cache: &TieredCache) -> usize {
    let removed = cache.invalidate_by_prefix(&namespace_prefix(DATASET_NAMESPACE));
    info!(removed, "Invalidated cached datasets");
    removed
}

/// Read and decode a dataset file, bypassing the cache.
///
/// # Errors
///
/// - `InputError::FileNotFound` if the file is missing
/// - `InputError::InvalidJson` if it does not parse
/// - `InputError::NotARecordArray` if it is not an array of objects
pub fn read_records(path: &Path) -> Result<Vec<Record>, InputError> {
    let text = std::fs::read_to_string(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => InputError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => InputError::Io(err),
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|err| InputError::InvalidJson {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    records_from_value(value)
}

/// Split a JSON array of objects into records.
///
/// # Errors
///
/// Returns `InputError::NotARecordArray` naming the first non-object element.
pub fn records_from_value(value: Value) -> Result<Vec<Record>, InputError> {
    let Value::Array(items) = value else {
        return Err(InputError::NotARecordArray { index: None });
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(InputError::NotARecordArray { index: Some(index) }),
        })
        .collect()
}

/// Build one column per distinct key, in order of first appearance.
///
/// Columns holding arrays or objects in any row are not sortable; their
/// cells display as compact JSON.
pub fn infer_columns(records: &[Record]) -> Columns<Record> {
    let mut ids: Vec<&str> = Vec::new();
    let mut nested: Vec<bool> = Vec::new();

    for record in records {
        for (id, value) in record {
            let is_nested = matches!(value, Value::Array(_) | Value::Object(_));
            match ids.iter().position(|known| *known == id.as_str()) {
                Some(pos) => nested[pos] |= is_nested,
                None => {
                    ids.push(id.as_str());
                    nested.push(is_nested);
                }
            }
        }
    }

    ids.into_iter()
        .zip(nested)
        .map(|(id, is_nested)| {
            let field = id.to_string();
            Column::new(id, id, move |record: &Record| {
                record.get(&field).map_or(CellValue::Null, CellValue::from_json)
            })
            .sortable(!is_nested)
        })
        .collect()
}
