//! dashgrid - Entry Point

use clap::Parser;
use dashgrid::cache::{FileStore, MemoryStore, TieredCache};
use dashgrid::config::ResolvedConfig;
use dashgrid::model::AppError;
use dashgrid::source::{DatasetSource, infer_columns, invalidate_datasets};
use dashgrid::state::AppState;
use dashgrid::view_state::WindowedListEngine;
use std::path::PathBuf;
use tracing::{info, warn};

/// dashgrid - windowed table viewer for large JSON datasets
#[derive(Parser, Debug)]
#[command(name = "dashgrid")]
#[command(version)]
#[command(about = "Browse large JSON record arrays in a virtualized, cached table")]
pub struct Args {
    /// Path to a JSON file holding an array of objects
    pub file: PathBuf,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Cache entry lifetime in seconds
    #[arg(long)]
    pub ttl: Option<u64>,

    /// Rows rendered beyond each edge of the viewport
    #[arg(long, allow_negative_numbers = true)]
    pub buffer_rows: Option<i64>,

    /// Keep the cache in memory only
    #[arg(long)]
    pub no_cache: bool,

    /// Drop cached datasets before loading
    #[arg(long)]
    pub refresh: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("dashgrid: {err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), AppError> {
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = dashgrid::config::load_config_with_precedence(args.config.clone())?;
        let merged = dashgrid::config::merge_config(config_file);
        let with_env = dashgrid::config::apply_env_overrides(merged);
        dashgrid::config::apply_cli_overrides(with_env, args.ttl, args.buffer_rows, args.no_cache)
    };

    dashgrid::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    // Reject bad numbers before the terminal switches to raw mode.
    let window = config.window_config()?;
    let paginator = config.paginator()?;
    info!(page_size = paginator.page_size(), "Window settings validated");

    let cache = open_cache(&config);
    let source = DatasetSource::new(&args.file)?;
    if args.refresh {
        invalidate_datasets(&cache);
    }

    let records = source.load(&cache)?;
    let columns = infer_columns(&records);
    let engine = WindowedListEngine::with_rows(columns, window, records);

    dashgrid::view::run_with_source(AppState::new(engine), cache, source)?;
    Ok(())
}

/// Build the cache the resolved configuration asks for.
///
/// An unusable store file degrades to a memory-only cache.
fn open_cache(config: &ResolvedConfig) -> TieredCache {
    if !config.durable_cache {
        info!("Durable cache disabled, using memory only");
        return TieredCache::with_config(MemoryStore::new(), config.cache_config());
    }

    let path = config.store_path();
    match FileStore::open(&path, config.cache_quota_bytes) {
        Ok(store) => TieredCache::with_config(store, config.cache_config()),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Cache store unavailable, using memory only");
            TieredCache::with_config(MemoryStore::new(), config.cache_config())
        }
    }
}
