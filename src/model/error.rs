//! Error types for the dashgrid binary.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level application error wrapping all failure modes
//!   - [`InputError`] - Dataset file reading and decoding failures
//!   - [`ConfigError`](crate::config::ConfigError) - Configuration file failures
//!   - [`WindowConfigError`](crate::view_state::WindowConfigError) - Invalid windowing numbers
//!   - [`LoggingError`](crate::logging::LoggingError) - Log file setup failures
//!   - [`TuiError`](crate::view::TuiError) - Terminal/TUI rendering failures
//!
//! Cache storage failures never show up here: the cache degrades to its
//! memory tier and logs them instead.

use crate::config::ConfigError;
use crate::logging::LoggingError;
use crate::view::TuiError;
use crate::view_state::WindowConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error encompassing all failure modes.
///
/// All variants are fatal: `main` restores the terminal, prints the error to
/// stderr and exits non-zero.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to load the dataset.
    #[error("Failed to load dataset: {0}")]
    Input(#[from] InputError),

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Resolved configuration holds unusable windowing numbers.
    #[error("Invalid window configuration: {0}")]
    WindowConfig(#[from] WindowConfigError),

    /// Log file could not be set up.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// Terminal or TUI rendering error.
    #[error("Terminal error: {0}")]
    Tui(#[from] TuiError),
}

/// Errors encountered when reading a dataset file.
#[derive(Debug, Error)]
pub enum InputError {
    /// The dataset file does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use dashgrid::model::InputError;
    ///
    /// let err = InputError::FileNotFound {
    ///     path: PathBuf::from("/tmp/missing.json"),
    /// };
    /// assert!(err.to_string().contains("/tmp/missing.json"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path as given on the command line.
        path: PathBuf,
    },

    /// The file is not valid JSON.
    #[error("Invalid JSON in {path}: {message}")]
    InvalidJson {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser message, including line and column.
        message: String,
    },

    /// The top-level JSON value is not an array of objects.
    ///
    /// `index` is `None` when the document itself is not an array.
    #[error("Expected an array of objects{}", offending_element(.index))]
    NotARecordArray {
        /// Position of the first offending element.
        index: Option<usize>,
    },

    /// The dataset parameters could not be turned into a cache key.
    #[error("Cannot derive cache key: {0}")]
    CacheKey(#[from] serde_json::Error),

    /// Generic I/O error reading the file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn offending_element(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!(" (element {i} is not an object)"),
        None => String::new(),
    }
}
