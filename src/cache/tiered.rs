//! Two-tier response cache.
//!
//! Reads check the in-memory tier, then the durable tier, promoting durable
//! hits into memory. Writes go to both tiers. Expired entries are removed from
//! both tiers when a read encounters them; nothing sweeps in the background.
//!
//! Durable-tier failures are logged and counted but never returned: the cache
//! degrades to memory-only behavior for that operation.
//!
//! When both tiers are locked together the durable lock is taken first.

use super::clock::{Clock, SystemClock};
use super::entry::{CacheEntry, DEFAULT_TTL};
use super::store::{DurableStore, MemoryStore, StoreError};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Cache-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL used by `set` and `get_or_set` when the caller passes none.
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
        }
    }
}

/// Counters describing cache effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads served from either tier.
    pub hits: u64,
    /// Reads that found nothing valid.
    pub misses: u64,
    /// Entries currently held in the memory tier (valid or not yet evicted).
    pub memory_entries: usize,
    /// Durable-tier operations that failed and were swallowed.
    pub durable_failures: u64,
}

impl CacheStats {
    /// Fraction of reads that hit, 0.0 when nothing was read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    durable_failures: AtomicU64,
}

/// Whether a lookup should be reflected in hit/miss counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tally {
    Count,
    Silent,
}

/// Per-key producer locks. At most one producer runs per key at a time;
/// waiters re-read the cache once the leader finishes.
struct FlightRegistry<L> {
    locks: Mutex<HashMap<String, Arc<L>>>,
}

impl<L: Default> FlightRegistry<L> {
    fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn acquire<'a>(&'a self, key: &'a str) -> Flight<'a, L> {
        let lock = self
            .locks
            .lock()
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(L::default()))
            .clone();
        Flight {
            registry: self,
            key,
            lock,
        }
    }

    /// Drop the registry's handle once no other caller holds one.
    fn release(&self, key: &str, lock: &Arc<L>) {
        let mut locks = self.locks.lock();
        let idle = locks
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, lock) && Arc::strong_count(lock) <= 2);
        if idle {
            locks.remove(key);
        }
    }

    fn in_flight(&self) -> usize {
        self.locks.lock().len()
    }
}

/// A caller's handle on a key's producer lock. Dropping it releases the key,
/// so a panicking producer or a cancelled future never leaves it registered.
struct Flight<'a, L: Default> {
    registry: &'a FlightRegistry<L>,
    key: &'a str,
    lock: Arc<L>,
}

impl<L: Default> Drop for Flight<'_, L> {
    fn drop(&mut self) {
        self.registry.release(self.key, &self.lock);
    }
}

/// Response cache over a memory tier and a durable tier.
///
/// Constructed explicitly by the host and dropped at shutdown; there is no
/// process-global instance.
///
/// # Example
///
/// ```
/// use dashgrid::cache::{MemoryStore, TieredCache};
///
/// let cache = TieredCache::new(MemoryStore::new());
/// cache.set("usage:{\"day\":1}", &vec![1, 2, 3]);
/// assert_eq!(cache.get::<Vec<i32>>("usage:{\"day\":1}"), Some(vec![1, 2, 3]));
/// ```
pub struct TieredCache {
    memory: RwLock<HashMap<String, CacheEntry>>,
    durable: Mutex<Box<dyn DurableStore>>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
    counters: Counters,
    flights: FlightRegistry<Mutex<()>>,
    async_flights: FlightRegistry<tokio::sync::Mutex<()>>,
}

impl TieredCache {
    /// Create a cache over `store` with default settings.
    pub fn new(store: impl DurableStore + 'static) -> Self {
        Self::with_config(store, CacheConfig::default())
    }

    /// Create a cache over `store` with explicit settings.
    pub fn with_config(store: impl DurableStore + 'static, config: CacheConfig) -> Self {
        Self::from_boxed(Box::new(store), config)
    }

    /// Create a cache over an already boxed store.
    pub fn from_boxed(store: Box<dyn DurableStore>, config: CacheConfig) -> Self {
        Self {
            memory: RwLock::new(HashMap::new()),
            durable: Mutex::new(store),
            clock: Arc::new(SystemClock),
            config,
            counters: Counters::default(),
            flights: FlightRegistry::new(),
            async_flights: FlightRegistry::new(),
        }
    }

    /// Cache whose durable tier lives only in this process.
    pub fn memory_only() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Active settings.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // ===== Reads =====

    /// Typed read.
    ///
    /// Returns `None` when the key is absent, expired, or holds a payload that
    /// does not deserialize as `T`.
    /// Only a decoded value counts as a hit.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self
            .lookup(key, Tally::Silent)
            .and_then(|payload| decode_payload(key, &payload));
        if value.is_some() {
            self.tally_hit(Tally::Count);
        } else {
            self.tally_miss(Tally::Count);
        }
        value
    }

    /// Untyped read of the raw JSON payload.
    pub fn get_value(&self, key: &str) -> Option<Arc<Value>> {
        self.lookup(key, Tally::Count)
    }

    /// Whether a valid entry exists. Applies the same lazy expiry as `get`
    /// but does not touch the hit/miss counters.
    pub fn contains(&self, key: &str) -> bool {
        self.lookup(key, Tally::Silent).is_some()
    }

    fn lookup(&self, key: &str, tally: Tally) -> Option<Arc<Value>> {
        let now = self.clock.now();

        let expired_in_memory = {
            let memory = self.memory.read();
            match memory.get(key) {
                Some(entry) if entry.is_valid_at(now) => {
                    debug!(key, "Cache hit (memory)");
                    self.tally_hit(tally);
                    return Some(entry.payload().clone());
                }
                Some(_) => true,
                None => false,
            }
        };

        if expired_in_memory {
            debug!(key, "Cache entry expired (memory)");
            self.evict_stale(key, now);
            self.tally_miss(tally);
            return None;
        }

        let mut durable = self.durable.lock();
        match self.read_durable(&mut **durable, key) {
            Some(entry) if entry.is_valid_at(now) => {
                debug!(key, "Cache hit (durable), promoting to memory");
                let payload = entry.payload().clone();
                self.memory.write().insert(key.to_string(), entry);
                self.tally_hit(tally);
                Some(payload)
            }
            Some(_) => {
                debug!(key, "Cache entry expired (durable)");
                self.drop_stale_locked(&mut **durable, key, now);
                self.tally_miss(tally);
                None
            }
            None => {
                debug!(key, "Cache miss");
                self.tally_miss(tally);
                None
            }
        }
    }

    fn read_durable(&self, durable: &mut dyn DurableStore, key: &str) -> Option<CacheEntry> {
        let raw = match durable.get_item(key) {
            Ok(raw) => raw?,
            Err(err) => {
                self.durable_failure("read", key, &err);
                return None;
            }
        };
        match CacheEntry::decode(&raw) {
            Ok(entry) => Some(entry),
            Err(err) => {
                self.durable_failure("decode", key, &err);
                if let Err(err) = durable.remove_item(key) {
                    self.durable_failure("remove", key, &err);
                }
                None
            }
        }
    }

    // ===== Writes =====

    /// Store `value` under `key` with the default TTL.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        self.set_with_ttl(key, value, self.config.default_ttl);
    }

    /// Store `value` under `key` with an explicit TTL.
    ///
    /// The memory tier is always written. A value that cannot be represented
    /// as JSON is not stored anywhere and is logged.
    pub fn set_with_ttl<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_value(value) {
            Ok(payload) => self.set_value(key, payload, ttl),
            Err(err) => warn!(key, error = %err, "Cannot cache value: not representable as JSON"),
        }
    }

    /// Store a raw JSON payload.
    ///
    /// If the durable tier refuses the write, any older durable record for
    /// `key` is removed so it cannot reappear after a restart.
    pub fn set_value(&self, key: &str, payload: Value, ttl: Duration) {
        let entry = CacheEntry::new(payload, self.clock.now(), ttl);
        let encoded = entry.encode();

        let mut durable = self.durable.lock();
        self.memory.write().insert(key.to_string(), entry);

        let result = encoded.and_then(|raw| durable.set_item(key, raw));
        if let Err(err) = result {
            self.durable_failure("write", key, &err);
            if let Err(err) = durable.remove_item(key) {
                self.durable_failure("remove", key, &err);
            }
        }
    }

    /// Return the cached value or compute, store and return it.
    ///
    /// Producers for the same key never overlap: a concurrent caller waits
    /// for the running producer and then reads its stored result. A failing
    /// producer stores nothing and its error is returned unchanged; the next
    /// waiter then runs its own producer.
    pub fn get_or_set<T, E, F>(&self, key: &str, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, E>,
    {
        self.get_or_set_with_ttl(key, self.config.default_ttl, producer)
    }

    /// [`get_or_set`](Self::get_or_set) with an explicit TTL.
    pub fn get_or_set_with_ttl<T, E, F>(&self, key: &str, ttl: Duration, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let flight = self.flights.acquire(key);
        let _guard = flight.lock.lock();
        self.produce_if_missing(key, ttl, producer)
    }

    /// Async variant of [`get_or_set`](Self::get_or_set).
    pub async fn get_or_set_async<T, E, F, Fut>(&self, key: &str, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.get_or_set_async_with_ttl(key, self.config.default_ttl, producer)
            .await
    }

    /// Async variant of [`get_or_set_with_ttl`](Self::get_or_set_with_ttl).
    pub async fn get_or_set_async_with_ttl<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        producer: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let flight = self.async_flights.acquire(key);
        let _guard = flight.lock.lock().await;
        if let Some(value) = self.recheck(key) {
            return Ok(value);
        }
        let value = producer().await?;
        self.set_with_ttl(key, &value, ttl);
        Ok(value)
    }

    fn produce_if_missing<T, E, F>(&self, key: &str, ttl: Duration, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.recheck(key) {
            return Ok(value);
        }
        let value = producer()?;
        self.set_with_ttl(key, &value, ttl);
        Ok(value)
    }

    /// Second look after waiting on a producer lock. A decoded value here is
    /// a real hit; a miss was already counted by the first look.
    fn recheck<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let payload = self.lookup(key, Tally::Silent)?;
        let value = decode_payload(key, &payload)?;
        self.tally_hit(Tally::Count);
        Some(value)
    }

    // ===== Invalidation =====

    /// Remove `key` from both tiers. Removing a missing key is a no-op.
    pub fn delete(&self, key: &str) {
        self.evict(key);
    }

    /// Remove every entry whose key starts with `prefix` from both tiers.
    ///
    /// Returns the number of distinct keys removed across tiers.
    pub fn invalidate_by_prefix(&self, prefix: &str) -> usize {
        let mut removed = BTreeSet::new();
        let mut durable = self.durable.lock();

        self.memory.write().retain(|key, _| {
            if key.starts_with(prefix) {
                removed.insert(key.clone());
                false
            } else {
                true
            }
        });

        match durable.remove_prefix(prefix) {
            Ok(keys) => removed.extend(keys),
            Err(err) => self.durable_failure("invalidate", prefix, &err),
        }

        debug!(prefix, removed = removed.len(), "Invalidated cache prefix");
        removed.len()
    }

    /// Remove everything from both tiers.
    ///
    /// If the durable store refuses a bulk clear, keys are removed one by one
    /// and any that still fail are left behind and logged.
    pub fn clear(&self) {
        let mut durable = self.durable.lock();
        self.memory.write().clear();

        let Err(err) = durable.clear() else {
            return;
        };
        self.durable_failure("clear", "*", &err);

        let keys = match durable.keys() {
            Ok(keys) => keys,
            Err(err) => {
                self.durable_failure("list", "*", &err);
                return;
            }
        };
        for key in keys {
            if let Err(err) = durable.remove_item(&key) {
                self.durable_failure("remove", &key, &err);
            }
        }
    }

    /// Remove every expired entry from both tiers and return how many keys
    /// were dropped. Undecodable durable records are dropped too.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = BTreeSet::new();
        let mut durable = self.durable.lock();

        self.memory.write().retain(|key, entry| {
            if entry.is_valid_at(now) {
                true
            } else {
                removed.insert(key.clone());
                false
            }
        });

        let keys = match durable.keys() {
            Ok(keys) => keys,
            Err(err) => {
                self.durable_failure("list", "*", &err);
                return removed.len();
            }
        };
        for key in keys {
            if !self.durable_is_stale(&**durable, &key, now) {
                continue;
            }
            match durable.remove_item(&key) {
                Ok(()) => {
                    removed.insert(key);
                }
                Err(err) => self.durable_failure("remove", &key, &err),
            }
        }

        removed.len()
    }

    // ===== Introspection =====

    /// Snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            memory_entries: self.memory.read().len(),
            durable_failures: self.counters.durable_failures.load(Ordering::Relaxed),
        }
    }

    /// Keys with a producer currently registered.
    pub fn in_flight(&self) -> usize {
        self.flights.in_flight() + self.async_flights.in_flight()
    }

    // ===== Internals =====

    fn evict(&self, key: &str) {
        let mut durable = self.durable.lock();
        self.memory.write().remove(key);
        if let Err(err) = durable.remove_item(key) {
            self.durable_failure("remove", key, &err);
        }
    }

    /// Drop `key` from both tiers only where it is still expired at `now`.
    /// A value stored after the expiry was observed survives.
    fn evict_stale(&self, key: &str, now: DateTime<Utc>) {
        let mut durable = self.durable.lock();
        self.drop_stale_locked(&mut **durable, key, now);
    }

    fn drop_stale_locked(&self, durable: &mut dyn DurableStore, key: &str, now: DateTime<Utc>) {
        {
            let mut memory = self.memory.write();
            if memory.get(key).is_some_and(|entry| !entry.is_valid_at(now)) {
                memory.remove(key);
            }
        }
        if self.durable_is_stale(durable, key, now) {
            if let Err(err) = durable.remove_item(key) {
                self.durable_failure("remove", key, &err);
            }
        }
    }

    /// Whether the durable record for `key` is expired or undecodable.
    fn durable_is_stale(&self, durable: &dyn DurableStore, key: &str, now: DateTime<Utc>) -> bool {
        match durable.get_item(key) {
            Ok(Some(raw)) => CacheEntry::decode(&raw).map_or(true, |e| !e.is_valid_at(now)),
            Ok(None) => false,
            Err(err) => {
                self.durable_failure("read", key, &err);
                false
            }
        }
    }

    fn durable_failure(&self, operation: &'static str, key: &str, err: &StoreError) {
        self.counters.durable_failures.fetch_add(1, Ordering::Relaxed);
        warn!(operation, key, error = %err, "Durable cache tier failure, continuing memory-only");
    }

    fn tally_hit(&self, tally: Tally) {
        if tally == Tally::Count {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn tally_miss(&self, tally: Tally) {
        if tally == Tally::Count {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl Default for TieredCache {
    fn default() -> Self {
        Self::memory_only()
    }
}

impl std::fmt::Debug for TieredCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredCache")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

fn decode_payload<T: DeserializeOwned>(key: &str, payload: &Value) -> Option<T> {
    match T::deserialize(payload) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, error = %err, "Cached payload does not match requested type");
            None
        }
    }
}

#[cfg(test)]
#[path = "tiered_tests.rs"]
mod tests;
