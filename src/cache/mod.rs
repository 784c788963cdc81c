//! Tiered client-side response cache.
//!
//! A [`TieredCache`] sits between data-fetching code and a slow remote API.
//! It keeps recently fetched payloads in an in-process map and mirrors them
//! into a [`DurableStore`] so they survive restarts. Every entry carries its
//! own TTL; expired entries are never returned and are removed lazily when a
//! read finds them.
//!
//! # Example
//!
//! ```
//! use dashgrid::cache::{cache_key, namespace_prefix, MemoryStore, TieredCache};
//! use serde_json::json;
//!
//! let cache = TieredCache::new(MemoryStore::new());
//! let key = cache_key("cost-breakdown", &json!({"month": "2025-01"})).unwrap();
//!
//! let rows: Vec<u32> = cache
//!     .get_or_set(&key, || Ok::<_, std::io::Error>(vec![10, 20]))
//!     .unwrap();
//! assert_eq!(rows, vec![10, 20]);
//!
//! // A data sync invalidates every cost breakdown at once.
//! cache.invalidate_by_prefix(&namespace_prefix("cost-breakdown"));
//! assert!(!cache.contains(&key));
//! ```

pub mod clock;
pub mod entry;
pub mod file_store;
pub mod key;
pub mod store;
pub mod tiered;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, DurableRecord, DEFAULT_TTL};
pub use file_store::FileStore;
pub use key::{cache_key, namespace_prefix};
pub use store::{DurableStore, MemoryStore, StoreError};
pub use tiered::{CacheConfig, CacheStats, TieredCache};
