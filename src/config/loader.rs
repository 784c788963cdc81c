//! Configuration file loading with precedence handling.

use crate::cache::CacheConfig;
use crate::view_state::{Paginator, WindowConfig, WindowConfigError};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "DASHGRID_CONFIG";
/// Environment variable overriding the cache TTL in seconds.
pub const TTL_ENV: &str = "DASHGRID_TTL";
/// Environment variable overriding the durable cache directory.
pub const CACHE_DIR_ENV: &str = "DASHGRID_CACHE_DIR";

/// File name of the durable cache inside the cache directory.
pub const STORE_FILE_NAME: &str = "store.json";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown fields.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/dashgrid/config.toml`.
///
/// Windowing numbers are read as signed integers so that zero or negative
/// values reach validation instead of failing as a parse error.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Default cache TTL in seconds.
    #[serde(default)]
    pub ttl_seconds: Option<u64>,

    /// Height of one table row in scroll units.
    #[serde(default)]
    pub row_height: Option<i64>,

    /// Rows materialized beyond each edge of the viewport.
    #[serde(default)]
    pub buffer_rows: Option<i64>,

    /// Rows per page in paginated mode.
    #[serde(default)]
    pub page_size: Option<i64>,

    /// Directory holding the durable cache file.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Byte quota for the durable cache. Unlimited when absent.
    #[serde(default)]
    pub cache_quota_bytes: Option<usize>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Default cache TTL in seconds.
    pub ttl_seconds: u64,
    /// Row height, validated by [`window_config`](Self::window_config).
    pub row_height: i64,
    /// Buffer rows, validated by [`window_config`](Self::window_config).
    pub buffer_rows: i64,
    /// Page size, validated by [`paginator`](Self::paginator).
    pub page_size: i64,
    /// Directory holding the durable cache file.
    pub cache_dir: PathBuf,
    /// Byte quota for the durable cache.
    pub cache_quota_bytes: Option<usize>,
    /// Whether the durable tier is used at all.
    pub durable_cache: bool,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: crate::cache::DEFAULT_TTL.as_secs(),
            row_height: 1,
            buffer_rows: WindowConfig::DEFAULT_BUFFER_ROWS as i64,
            page_size: Paginator::default().page_size() as i64,
            cache_dir: default_cache_dir(),
            cache_quota_bytes: None,
            durable_cache: true,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Cache settings.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            default_ttl: Duration::from_secs(self.ttl_seconds),
        }
    }

    /// Location of the durable cache file.
    pub fn store_path(&self) -> PathBuf {
        self.cache_dir.join(STORE_FILE_NAME)
    }

    /// Validated windowing parameters.
    ///
    /// # Errors
    ///
    /// Returns `WindowConfigError` for a non-positive row height or negative
    /// buffer.
    pub fn window_config(&self) -> Result<WindowConfig, WindowConfigError> {
        WindowConfig::from_signed(self.row_height, self.buffer_rows)
    }

    /// Validated paginator.
    ///
    /// # Errors
    ///
    /// Returns `WindowConfigError::NonPositivePageSize` for a page size below 1.
    pub fn paginator(&self) -> Result<Paginator, WindowConfigError> {
        let size = usize::try_from(self.page_size)
            .map_err(|_| WindowConfigError::NonPositivePageSize(self.page_size))?;
        Paginator::new(size)
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/dashgrid/dashgrid.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("dashgrid").join("dashgrid.log")
    } else {
        PathBuf::from("dashgrid.log")
    }
}

/// Resolve default durable cache directory.
///
/// Returns `~/.cache/dashgrid` on Unix-like systems. Falls back to a
/// `.dashgrid-cache` directory under the current directory.
pub fn default_cache_dir() -> PathBuf {
    if let Some(cache_dir) = dirs::cache_dir() {
        cache_dir.join("dashgrid")
    } else {
        PathBuf::from(".dashgrid-cache")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/dashgrid/config.toml` on Unix, appropriate path on
/// other platforms. Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dashgrid").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `DASHGRID_CONFIG` environment variable
/// 3. Default path `~/.config/dashgrid/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `DASHGRID_TTL`: cache TTL in seconds (unparsable values are ignored)
/// - `DASHGRID_CACHE_DIR`: durable cache directory
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(raw) = std::env::var(TTL_ENV) {
        match raw.trim().parse::<u64>() {
            Ok(ttl) => config.ttl_seconds = ttl,
            Err(err) => warn!(value = %raw, error = %err, "Ignoring invalid {TTL_ENV}"),
        }
    }

    if let Ok(dir) = std::env::var(CACHE_DIR_ENV) {
        if !dir.is_empty() {
            config.cache_dir = PathBuf::from(dir);
        }
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        ttl_seconds: config.ttl_seconds.unwrap_or(defaults.ttl_seconds),
        row_height: config.row_height.unwrap_or(defaults.row_height),
        buffer_rows: config.buffer_rows.unwrap_or(defaults.buffer_rows),
        page_size: config.page_size.unwrap_or(defaults.page_size),
        cache_dir: config.cache_dir.unwrap_or(defaults.cache_dir),
        cache_quota_bytes: config.cache_quota_bytes.or(defaults.cache_quota_bytes),
        durable_cache: defaults.durable_cache,
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
///
/// # Arguments
///
/// * `config` - Base resolved config (already merged with defaults, file, and env vars)
/// * `ttl_override` - Optional TTL from `--ttl`
/// * `buffer_rows_override` - Optional buffer from `--buffer-rows`
/// * `no_cache` - `--no-cache`: keep the cache in memory only
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    ttl_override: Option<u64>,
    buffer_rows_override: Option<i64>,
    no_cache: bool,
) -> ResolvedConfig {
    if let Some(ttl) = ttl_override {
        config.ttl_seconds = ttl;
    }

    if let Some(buffer_rows) = buffer_rows_override {
        config.buffer_rows = buffer_rows;
    }

    if no_cache {
        config.durable_cache = false;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
