//! Tests for TieredCache.

use super::*;
use crate::cache::clock::ManualClock;
use chrono::TimeZone;
use serde_json::json;
use std::sync::atomic::AtomicUsize;
use std::sync::Barrier;

// ===== Test Helpers =====

/// Which durable operations should fail.
#[derive(Debug, Default, Clone, Copy)]
struct Faults {
    reads: bool,
    writes: bool,
    removes: bool,
    bulk_clear: bool,
    listing: bool,
}

/// Durable store whose contents and fault switches stay visible to the test
/// after the cache takes ownership of a clone.
#[derive(Debug, Clone, Default)]
struct SharedStore {
    inner: Arc<Mutex<MemoryStore>>,
    faults: Arc<Mutex<Faults>>,
    read_gate: Arc<Mutex<Option<Arc<Barrier>>>>,
}

impl SharedStore {
    fn with_quota(limit: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryStore::with_quota(limit))),
            ..Self::default()
        }
    }

    fn raw(&self, key: &str) -> Option<String> {
        self.inner.lock().get_item(key).unwrap()
    }

    fn put_raw(&self, key: &str, raw: &str) {
        self.inner.lock().set_item(key, raw.to_string()).unwrap();
    }

    fn len(&self) -> usize {
        self.inner.lock().len()
    }

    fn set_faults(&self, faults: Faults) {
        *self.faults.lock() = faults;
    }

    /// Make the next durable read meet the test at `gate`, then stall briefly
    /// before answering.
    fn stall_next_read(&self, gate: Arc<Barrier>) {
        *self.read_gate.lock() = Some(gate);
    }

    fn unavailable() -> StoreError {
        StoreError::Unavailable("injected fault".to_string())
    }
}

impl DurableStore for SharedStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.faults.lock().reads {
            return Err(Self::unavailable());
        }
        let gate = self.read_gate.lock().take();
        if let Some(gate) = gate {
            gate.wait();
            std::thread::sleep(Duration::from_millis(100));
        }
        self.inner.lock().get_item(key)
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        if self.faults.lock().writes {
            return Err(Self::unavailable());
        }
        self.inner.lock().set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        if self.faults.lock().removes {
            return Err(Self::unavailable());
        }
        self.inner.lock().remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        if self.faults.lock().listing {
            return Err(Self::unavailable());
        }
        self.inner.lock().keys()
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        if self.faults.lock().bulk_clear {
            return Err(Self::unavailable());
        }
        self.inner.lock().clear()
    }
}

fn start_time() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
}

fn cache_over(store: &SharedStore, clock: &ManualClock) -> TieredCache {
    TieredCache::new(store.clone()).with_clock(Arc::new(clock.clone()))
}

fn setup() -> (TieredCache, SharedStore, ManualClock) {
    let store = SharedStore::default();
    let clock = ManualClock::new(start_time());
    (cache_over(&store, &clock), store, clock)
}

// ===== get / set =====

#[test]
fn set_then_get_returns_value() {
    let (cache, _, _) = setup();
    cache.set("cost-breakdown:{}", &json!({"total": 42.5}));
    assert_eq!(
        cache.get::<Value>("cost-breakdown:{}"),
        Some(json!({"total": 42.5}))
    );
}

#[test]
fn set_writes_both_tiers() {
    let (cache, store, _) = setup();
    cache.set("k", &7u32);
    assert_eq!(cache.stats().memory_entries, 1);
    let raw = store.raw("k").expect("durable record written");
    let record: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(record["data"], json!(7));
    assert_eq!(record["expiration"], json!(300_000));
}

#[test]
fn get_missing_key_is_none() {
    let (cache, _, _) = setup();
    assert_eq!(cache.get::<u32>("missing"), None);
    assert_eq!(cache.stats().misses, 1);
}

#[test]
fn value_is_served_until_ttl_elapses() {
    let (cache, _, clock) = setup();
    cache.set("k", &"v");
    clock.advance(DEFAULT_TTL);
    assert_eq!(cache.get::<String>("k"), Some("v".to_string()));
    clock.advance(Duration::from_millis(1));
    assert_eq!(cache.get::<String>("k"), None);
}

#[test]
fn expired_entry_is_deleted_from_both_tiers() {
    let (cache, store, clock) = setup();
    cache.set_with_ttl("k", &1, Duration::from_secs(10));
    clock.advance(Duration::from_secs(11));

    assert_eq!(cache.get::<i32>("k"), None);
    assert_eq!(store.raw("k"), None);
    assert_eq!(cache.stats().memory_entries, 0);
}

#[test]
fn expired_durable_record_is_not_resurrected() {
    let (cache, store, clock) = setup();
    cache.set_with_ttl("k", &1, Duration::from_secs(10));
    let raw = store.raw("k").unwrap();
    clock.advance(Duration::from_secs(60));

    assert_eq!(cache.get::<i32>("k"), None);
    // Durable tier still physically holds the stale record.
    store.put_raw("k", &raw);
    assert_eq!(cache.get::<i32>("k"), None);
    assert_eq!(cache.get::<i32>("k"), None);
    assert_eq!(store.raw("k"), None);
}

#[test]
fn durable_hit_is_promoted_to_memory() {
    let store = SharedStore::default();
    let clock = ManualClock::new(start_time());
    cache_over(&store, &clock).set("k", &vec!["a", "b"]);

    // A fresh cache models a process restart: memory is empty, durable is not.
    let restarted = cache_over(&store, &clock);
    assert_eq!(restarted.stats().memory_entries, 0);
    assert_eq!(
        restarted.get::<Vec<String>>("k"),
        Some(vec!["a".to_string(), "b".to_string()])
    );
    assert_eq!(restarted.stats().memory_entries, 1);

    // Served from memory even once the durable copy is gone.
    store.inner.lock().clear().unwrap();
    assert!(restarted.get::<Vec<String>>("k").is_some());
}

#[test]
fn promoted_entry_keeps_original_stored_at() {
    let store = SharedStore::default();
    let clock = ManualClock::new(start_time());
    cache_over(&store, &clock).set_with_ttl("k", &1, Duration::from_secs(30));

    clock.advance(Duration::from_secs(20));
    let restarted = cache_over(&store, &clock);
    assert_eq!(restarted.get::<i32>("k"), Some(1));

    clock.advance(Duration::from_secs(11));
    assert_eq!(restarted.get::<i32>("k"), None);
}

#[test]
fn per_call_ttl_overrides_default() {
    let (cache, _, clock) = setup();
    cache.set_with_ttl("short", &1, Duration::from_secs(1));
    cache.set("long", &2);
    clock.advance(Duration::from_secs(2));
    assert_eq!(cache.get::<i32>("short"), None);
    assert_eq!(cache.get::<i32>("long"), Some(2));
}

#[test]
fn configured_default_ttl_is_used() {
    let store = SharedStore::default();
    let clock = ManualClock::new(start_time());
    let cache = TieredCache::with_config(
        store,
        CacheConfig {
            default_ttl: Duration::from_secs(5),
        },
    )
    .with_clock(Arc::new(clock.clone()));

    cache.set("k", &1);
    clock.advance(Duration::from_secs(6));
    assert_eq!(cache.get::<i32>("k"), None);
}

#[test]
fn overwrite_replaces_value_and_resets_stored_at() {
    let (cache, _, clock) = setup();
    cache.set_with_ttl("k", &1, Duration::from_secs(10));
    clock.advance(Duration::from_secs(8));
    cache.set_with_ttl("k", &2, Duration::from_secs(10));
    clock.advance(Duration::from_secs(8));
    assert_eq!(cache.get::<i32>("k"), Some(2));
}

#[test]
fn type_mismatch_reads_as_none_without_evicting() {
    let (cache, store, _) = setup();
    cache.set("k", &"text");
    assert_eq!(cache.get::<u64>("k"), None);
    assert!(store.raw("k").is_some());
    assert_eq!(cache.get::<String>("k"), Some("text".to_string()));
}

#[test]
fn expiry_observed_during_a_concurrent_set_keeps_the_new_value() {
    let store = SharedStore::default();
    let clock = ManualClock::new(start_time());
    cache_over(&store, &clock).set_with_ttl("k", &"stale", Duration::from_secs(1));
    clock.advance(Duration::from_secs(2));

    let cache = cache_over(&store, &clock);
    let gate = Arc::new(Barrier::new(2));
    store.stall_next_read(gate.clone());

    std::thread::scope(|scope| {
        let reader = scope.spawn(|| cache.get::<String>("k"));
        gate.wait();
        cache.set("k", &"fresh");
        assert_eq!(reader.join().unwrap(), None);
    });

    assert_eq!(cache.get::<String>("k"), Some("fresh".to_string()));
    assert!(store.raw("k").is_some());
}

#[test]
fn memory_expiry_does_not_evict_a_newer_durable_record() {
    let store = SharedStore::default();
    let clock = ManualClock::new(start_time());
    let cache = cache_over(&store, &clock);
    cache.set_with_ttl("k", &1, Duration::from_secs(1));
    clock.advance(Duration::from_secs(2));

    // Another process refreshed the durable record after this one cached it.
    cache_over(&store, &clock).set("k", &2);

    assert_eq!(cache.get::<i32>("k"), None);
    assert!(store.raw("k").is_some());
    assert_eq!(cache.get::<i32>("k"), Some(2));
}

#[test]
fn get_value_returns_raw_payload() {
    let (cache, _, _) = setup();
    cache.set("k", &json!([1, null]));
    assert_eq!(cache.get_value("k").as_deref(), Some(&json!([1, null])));
}

// ===== durable failures =====

#[test]
fn quota_exceeded_write_still_serves_from_memory() {
    let store = SharedStore::with_quota(16);
    let clock = ManualClock::new(start_time());
    let cache = cache_over(&store, &clock);

    cache.set("big", &"x".repeat(100));
    assert_eq!(cache.get::<String>("big"), Some("x".repeat(100)));
    assert_eq!(store.raw("big"), None);
    assert_eq!(cache.stats().durable_failures, 1);
}

#[test]
fn failed_overwrite_does_not_leave_old_record_for_restart() {
    let store = SharedStore::with_quota(100);
    let clock = ManualClock::new(start_time());
    let cache = cache_over(&store, &clock);

    cache.set("k", &"old");
    cache.set("k", &"x".repeat(200));
    assert_eq!(cache.get::<String>("k"), Some("x".repeat(200)));
    assert_eq!(store.raw("k"), None);

    let restarted = cache_over(&store, &clock);
    assert_eq!(restarted.get::<String>("k"), None);
}

#[test]
fn durable_read_failure_degrades_to_miss() {
    let store = SharedStore::default();
    let clock = ManualClock::new(start_time());
    cache_over(&store, &clock).set("k", &1);

    let restarted = cache_over(&store, &clock);
    store.set_faults(Faults {
        reads: true,
        ..Faults::default()
    });
    assert_eq!(restarted.get::<i32>("k"), None);
    assert_eq!(restarted.stats().durable_failures, 1);
}

#[test]
fn corrupt_durable_record_is_dropped() {
    let (cache, store, _) = setup();
    store.put_raw("k", "{not json");
    assert_eq!(cache.get::<i32>("k"), None);
    assert_eq!(store.raw("k"), None);
    assert_eq!(cache.stats().durable_failures, 1);
}

#[test]
fn delete_survives_durable_remove_failure() {
    let (cache, store, _) = setup();
    cache.set("k", &1);
    store.set_faults(Faults {
        removes: true,
        ..Faults::default()
    });
    cache.delete("k");
    assert_eq!(cache.stats().memory_entries, 0);
    assert_eq!(cache.stats().durable_failures, 1);
}

// ===== delete / prefix / clear =====

#[test]
fn delete_removes_both_tiers_and_is_idempotent() {
    let (cache, store, _) = setup();
    cache.set("k", &1);
    cache.delete("k");
    cache.delete("k");
    assert_eq!(cache.get::<i32>("k"), None);
    assert_eq!(store.raw("k"), None);
}

#[test]
fn invalidate_by_prefix_removes_only_matching_keys() {
    let (cache, store, _) = setup();
    cache.set("a:1", &1);
    cache.set("a:2", &2);
    cache.set("b:x", &3);

    let removed = cache.invalidate_by_prefix("a:");

    assert_eq!(removed, 2);
    assert_eq!(cache.get::<i32>("a:1"), None);
    assert_eq!(cache.get::<i32>("a:2"), None);
    assert_eq!(cache.get::<i32>("b:x"), Some(3));
    assert_eq!(store.len(), 1);
}

#[test]
fn invalidate_by_prefix_reaches_durable_only_entries() {
    let store = SharedStore::default();
    let clock = ManualClock::new(start_time());
    cache_over(&store, &clock).set("cost-breakdown:{\"m\":1}", &1);

    let restarted = cache_over(&store, &clock);
    assert_eq!(restarted.invalidate_by_prefix("cost-breakdown:"), 1);
    assert_eq!(restarted.get::<i32>("cost-breakdown:{\"m\":1}"), None);
}

#[test]
fn clear_empties_both_tiers() {
    let (cache, store, _) = setup();
    cache.set("a", &1);
    cache.set("b", &2);
    cache.clear();
    assert_eq!(cache.stats().memory_entries, 0);
    assert_eq!(store.len(), 0);
}

#[test]
fn clear_falls_back_to_per_key_removal() {
    let (cache, store, _) = setup();
    cache.set("a", &1);
    cache.set("b", &2);
    store.set_faults(Faults {
        bulk_clear: true,
        ..Faults::default()
    });
    cache.clear();
    assert_eq!(store.len(), 0);
}

#[test]
fn clear_does_not_panic_when_durable_tier_is_down() {
    let (cache, store, _) = setup();
    cache.set("a", &1);
    store.set_faults(Faults {
        reads: true,
        writes: true,
        removes: true,
        bulk_clear: true,
        listing: true,
    });
    cache.clear();
    assert_eq!(cache.stats().memory_entries, 0);
    assert!(cache.stats().durable_failures >= 2);
}

#[test]
fn purge_expired_sweeps_both_tiers() {
    let (cache, store, clock) = setup();
    cache.set_with_ttl("old", &1, Duration::from_secs(1));
    cache.set_with_ttl("new", &2, Duration::from_secs(100));
    store.put_raw("garbage", "???");
    clock.advance(Duration::from_secs(5));

    assert_eq!(cache.purge_expired(), 2);
    assert!(store.raw("new").is_some());
    assert_eq!(store.len(), 1);
    assert_eq!(cache.stats().memory_entries, 1);
}

// ===== get_or_set =====

#[test]
fn get_or_set_runs_producer_once_for_sequential_calls() {
    let (cache, _, _) = setup();
    let calls = AtomicUsize::new(0);
    let produce = || {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(vec![1, 2, 3])
    };

    let first = cache.get_or_set("k", produce).unwrap();
    let second = cache.get_or_set("k", produce).unwrap();

    assert_eq!(first, vec![1, 2, 3]);
    assert_eq!(second, vec![1, 2, 3]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn get_or_set_reruns_producer_after_expiry() {
    let (cache, _, clock) = setup();
    let calls = AtomicUsize::new(0);
    let produce = || Ok::<_, String>(calls.fetch_add(1, Ordering::SeqCst));

    cache
        .get_or_set_with_ttl("k", Duration::from_secs(1), produce)
        .unwrap();
    clock.advance(Duration::from_secs(2));
    let second = cache
        .get_or_set_with_ttl("k", Duration::from_secs(1), produce)
        .unwrap();

    assert_eq!(second, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn get_or_set_propagates_producer_error_and_stores_nothing() {
    let (cache, store, _) = setup();
    let result: Result<u32, String> = cache.get_or_set("k", || Err("upstream 503".to_string()));

    assert_eq!(result, Err("upstream 503".to_string()));
    assert!(!cache.contains("k"));
    assert_eq!(store.len(), 0);
    assert_eq!(cache.in_flight(), 0);
}

#[test]
fn get_or_set_single_flight_across_threads() {
    let (cache, _, _) = setup();
    let calls = &AtomicUsize::new(0);
    let barrier = &std::sync::Barrier::new(8);
    let cache = &cache;

    let results: Vec<u32> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(move || {
                    barrier.wait();
                    cache
                        .get_or_set("shared", || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(Duration::from_millis(50));
                            Ok::<_, String>(99)
                        })
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results, vec![99; 8]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.in_flight(), 0);
}

#[test]
fn failed_leader_lets_next_caller_produce() {
    let (cache, _, _) = setup();
    let first: Result<i32, &str> = cache.get_or_set("k", || Err("boom"));
    let second: Result<i32, &str> = cache.get_or_set("k", || Ok(5));
    assert!(first.is_err());
    assert_eq!(second, Ok(5));
}

#[tokio::test]
async fn get_or_set_async_runs_producer_once_for_overlapping_calls() {
    let (cache, _, _) = setup();
    let calls = &AtomicUsize::new(0);
    let produce = move || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok::<_, String>(json!({"rows": 3}))
    };

    let (a, b) = tokio::join!(
        cache.get_or_set_async("k", produce),
        cache.get_or_set_async("k", produce)
    );

    assert_eq!(a.unwrap(), json!({"rows": 3}));
    assert_eq!(b.unwrap(), json!({"rows": 3}));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.in_flight(), 0);
}

#[test]
fn panicking_producer_releases_its_key() {
    let (cache, _, _) = setup();
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        cache.get_or_set("k", || -> Result<u32, String> { panic!("producer crashed") })
    }));

    assert!(outcome.is_err());
    assert_eq!(cache.in_flight(), 0);
    assert_eq!(cache.get_or_set("k", || Ok::<_, String>(3)), Ok(3));
}

#[test]
fn get_or_set_type_mismatch_is_not_counted_as_hit() {
    let (cache, _, _) = setup();
    cache.set("k", &"text");

    let value = cache.get_or_set("k", || Ok::<_, String>(5u32));

    assert_eq!(value, Ok(5));
    let stats = cache.stats();
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn cancelled_async_caller_releases_its_key() {
    let (cache, _, _) = setup();
    let pending = cache.get_or_set_async("k", || async {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok::<_, String>(1)
    });

    let outcome = tokio::time::timeout(Duration::from_millis(20), pending).await;

    assert!(outcome.is_err());
    assert_eq!(cache.in_flight(), 0);
    let value = cache
        .get_or_set_async("k", || async { Ok::<_, String>(2) })
        .await;
    assert_eq!(value, Ok(2));
}

#[tokio::test]
async fn get_or_set_async_propagates_error() {
    let (cache, _, _) = setup();
    let result: Result<i32, String> = cache
        .get_or_set_async("k", || async { Err("timeout".to_string()) })
        .await;
    assert_eq!(result, Err("timeout".to_string()));
    assert!(!cache.contains("k"));
}

// ===== stats =====

#[test]
fn contains_does_not_count_as_read() {
    let (cache, _, _) = setup();
    cache.set("k", &1);
    assert!(cache.contains("k"));
    assert!(!cache.contains("other"));
    let stats = cache.stats();
    assert_eq!(stats.hits + stats.misses, 0);
}

#[test]
fn hit_rate_reflects_reads() {
    let (cache, _, _) = setup();
    cache.set("k", &1);
    cache.get::<i32>("k");
    cache.get::<i32>("k");
    cache.get::<i32>("k");
    cache.get::<i32>("missing");
    let stats = cache.stats();
    assert_eq!(stats.hits, 3);
    assert_eq!(stats.misses, 1);
    assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    assert_eq!(CacheStats::default().hit_rate(), 0.0);
}
