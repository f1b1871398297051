//! Weighted, per-entry-expiring, concurrent associative store (§4.1).
//!
//! Built on [`moka::sync::Cache`] for its weight-bounded admission/eviction machinery
//! (§9 Design Notes: "reach for an existing concurrent, weight-bounded, per-entry-expiring
//! cache data structure rather than hand-rolling eviction bookkeeping"). moka's own
//! time-to-live support is wall-clock based and not injectable, so it is deliberately not
//! used for expiry: every entry instead carries its own absolute `expires_at_nanos`, checked
//! against the injected [`crate::clock::Clock`] on every read. This is the same
//! store-owns-the-clock-check shape as the teacher's `CacheEntry::is_expired`, generalized
//! from a relative `Option<u64>` TTL to an absolute per-entry timestamp.

use std::sync::Arc;

use moka::notification::RemovalCause;
use moka::sync::Cache;

use crate::clock::Clock;
use crate::key::{CacheKey, CacheValue};
use crate::memory_estimator::MemoryEstimator;
use crate::stats::{CacheStats, MeterSink};

/// Fixed per-entry bookkeeping overhead folded into the weigher, matching §4.1's
/// "a fixed bookkeeping constant" — a tuning value, not a correctness value.
const ENTRY_OVERHEAD_BYTES: u32 = 64;

#[derive(Clone, Debug)]
pub struct StoredEntry {
    pub value: CacheValue,
    /// Absolute expiry in nanoseconds on the store's clock, or `i64::MAX` for "never".
    pub expires_at_nanos: i64,
}

impl StoredEntry {
    fn is_expired(&self, now_nanos: i64) -> bool {
        now_nanos >= self.expires_at_nanos
    }
}

fn weigh(key: &CacheKey, entry: &StoredEntry) -> u32 {
    let bytes = key.estimate_memory() + entry.value.estimate_memory() + ENTRY_OVERHEAD_BYTES as usize;
    bytes.min(u32::MAX as usize) as u32
}

/// The weighted TTL store itself.
pub struct WeightedTtlStore {
    inner: Cache<CacheKey, StoredEntry>,
    clock: Arc<dyn Clock>,
    stats: Arc<CacheStats>,
    meter_sink: Option<Arc<dyn MeterSink>>,
}

impl WeightedTtlStore {
    /// `capacity_bytes` bounds the sum of `weigh()` outputs over all live entries (§3
    /// invariant 2). `clock` is the sole source of time for expiry checks (§5).
    pub fn new(capacity_bytes: u64, clock: Arc<dyn Clock>) -> Self {
        Self::with_meter_sink(capacity_bytes, clock, None)
    }

    /// Like [`Self::new`], additionally forwarding hit/miss/eviction counts to `meter_sink`
    /// when one is configured (§4.2 "Statistics reporting"). `CacheStats` counts internally
    /// either way; the sink call is the only part that costs anything when absent, and that
    /// cost is a single branch.
    pub fn with_meter_sink(
        capacity_bytes: u64,
        clock: Arc<dyn Clock>,
        meter_sink: Option<Arc<dyn MeterSink>>,
    ) -> Self {
        let stats = Arc::new(CacheStats::new());
        let eviction_stats = Arc::clone(&stats);
        let eviction_sink = meter_sink.clone();
        let inner = Cache::builder()
            .max_capacity(capacity_bytes)
            .weigher(weigh)
            .eviction_listener(move |_key, value, cause| {
                if cause == RemovalCause::Size {
                    eviction_stats.record_evictions(1);
                    if let Some(sink) = &eviction_sink {
                        sink.record_eviction(1);
                    }
                    tracing::trace!(
                        freed_bytes = value.value.estimate_memory(),
                        "evicted cache entry under capacity pressure"
                    );
                }
            })
            .build();
        Self {
            inner,
            clock,
            stats,
            meter_sink,
        }
    }

    /// Inserts or replaces the entry for `key`. `expires_at_nanos` of `i64::MAX` means
    /// "never"; a value at or before `now` means the entry is immediately evictable
    /// (§4.1: "zero maps to immediate eviction").
    pub fn put(&self, key: CacheKey, value: CacheValue, expires_at_nanos: i64) {
        let now = self.clock.now_nanos();
        if expires_at_nanos <= now {
            self.inner.invalidate(&key);
            return;
        }
        self.inner.insert(
            key,
            StoredEntry {
                value,
                expires_at_nanos,
            },
        );
    }

    /// Reads preserve remaining life: a hit never extends `expires_at_nanos` (§4.1).
    pub fn get(&self, key: &CacheKey) -> Option<CacheValue> {
        let now = self.clock.now_nanos();
        match self.inner.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                self.stats.record_hit();
                if let Some(sink) = &self.meter_sink {
                    sink.record_hit();
                }
                Some(entry.value)
            }
            Some(_expired) => {
                self.inner.invalidate(key);
                self.stats.record_miss();
                if let Some(sink) = &self.meter_sink {
                    sink.record_miss();
                }
                None
            }
            None => {
                self.stats.record_miss();
                if let Some(sink) = &self.meter_sink {
                    sink.record_miss();
                }
                None
            }
        }
    }

    pub fn remove(&self, key: &CacheKey) {
        self.inner.invalidate(key);
    }

    /// Removes every entry belonging to `repo`, and no entry belonging to any other
    /// repository (§3 invariant 4, §8 property 3).
    pub fn clear_repository(&self, repo: &crate::key::RepositoryId) {
        let repo = repo.clone();
        self.inner
            .invalidate_entries_if(move |key, _value| &key.repo == &repo)
            .expect("invalidate_entries_if requires an eviction listener or TTI/TTL policy, which this store always configures");
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Approximate current weighted size in bytes; `moka` updates this asynchronously via a
    /// maintenance task, so this is "eventually consistent" rather than exact (§8 property 4
    /// notes "subject to eviction lag").
    pub fn weighted_size(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.weighted_size()
    }

    #[cfg(test)]
    pub(crate) fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TestClock;
    use crate::key::{ObjId, RepositoryId};

    fn key(repo: &str, id: &[u8]) -> CacheKey {
        CacheKey::new(RepositoryId::from(repo), ObjId::from(id.to_vec()))
    }

    #[test]
    fn put_then_get_round_trips() {
        let clock = Arc::new(TestClock::new());
        let store = WeightedTtlStore::new(1024 * 1024, clock);
        let k = key("r1", &[0xAA]);
        store.put(k.clone(), CacheValue::Present(Arc::from(vec![1, 2, 3])), i64::MAX);
        assert_eq!(
            store.get(&k),
            Some(CacheValue::Present(Arc::from(vec![1, 2, 3])))
        );
    }

    #[test]
    fn expiry_makes_get_return_miss_without_explicit_removal() {
        let clock = Arc::new(TestClock::new());
        let store = WeightedTtlStore::new(1024 * 1024, clock.clone());
        let k = key("r1", &[0xBB]);
        store.put(k.clone(), CacheValue::Negative, 10_000_000_000);
        clock.set_nanos(5_000_000_000);
        assert_eq!(store.get(&k), Some(CacheValue::Negative));
        clock.set_nanos(11_000_000_000);
        assert_eq!(store.get(&k), None);
    }

    #[test]
    fn unlimited_survives_any_finite_advance() {
        let clock = Arc::new(TestClock::new());
        let store = WeightedTtlStore::new(1024 * 1024, clock.clone());
        let k = key("r1", &[0xCC]);
        store.put(k.clone(), CacheValue::Present(Arc::from(vec![9])), i64::MAX);
        clock.set_nanos(i64::MAX - 1);
        assert!(store.get(&k).is_some());
    }

    #[test]
    fn read_does_not_extend_life() {
        let clock = Arc::new(TestClock::new());
        let store = WeightedTtlStore::new(1024 * 1024, clock.clone());
        let k = key("r1", &[0xDD]);
        store.put(k.clone(), CacheValue::Present(Arc::from(vec![1])), 10_000);
        clock.set_nanos(5_000);
        assert!(store.get(&k).is_some());
        clock.set_nanos(10_001);
        assert!(store.get(&k).is_none());
    }

    #[test]
    fn clear_repository_is_isolated() {
        let clock = Arc::new(TestClock::new());
        let store = WeightedTtlStore::new(1024 * 1024, clock);
        let a = key("r1", &[0xAA]);
        let b = key("r2", &[0xBB]);
        store.put(a.clone(), CacheValue::Present(Arc::from(vec![1])), i64::MAX);
        store.put(b.clone(), CacheValue::Present(Arc::from(vec![2])), i64::MAX);
        store.clear_repository(&RepositoryId::from("r1"));
        assert_eq!(store.get(&a), None);
        assert_eq!(
            store.get(&b),
            Some(CacheValue::Present(Arc::from(vec![2])))
        );
    }

    #[test]
    fn key_equality_ignores_expiry() {
        let k1 = key("r1", &[0xAA]);
        let k2 = key("r1", &[0xAA]);
        assert_eq!(k1, k2);
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut h1 = DefaultHasher::new();
        let mut h2 = DefaultHasher::new();
        k1.hash(&mut h1);
        k2.hash(&mut h2);
        assert_eq!(h1.finish(), h2.finish());
    }

    #[test]
    fn weight_stays_bounded_under_eviction() {
        let clock = Arc::new(TestClock::new());
        // Capacity for roughly 3 entries of the size below.
        let one_entry_weight = weigh(
            &key("r1", &[0u8; 8]),
            &StoredEntry {
                value: CacheValue::Present(Arc::from(vec![0u8; 64])),
                expires_at_nanos: i64::MAX,
            },
        ) as u64;
        let store = WeightedTtlStore::new(one_entry_weight * 3, clock);
        for i in 0..4u8 {
            store.put(
                key("r1", &[i]),
                CacheValue::Present(Arc::from(vec![0u8; 64])),
                i64::MAX,
            );
        }
        assert!(store.weighted_size() <= one_entry_weight * 3);
        let present_count = (0..4u8).filter(|i| store.get(&key("r1", &[*i])).is_some()).count();
        assert!(present_count < 4);
    }

    #[test]
    fn meter_sink_receives_hits_and_misses_when_configured() {
        use parking_lot::Mutex;

        #[derive(Default)]
        struct RecordingSink {
            hits: Mutex<u64>,
            misses: Mutex<u64>,
        }
        impl MeterSink for RecordingSink {
            fn record_hit(&self) {
                *self.hits.lock() += 1;
            }
            fn record_miss(&self) {
                *self.misses.lock() += 1;
            }
            fn record_eviction(&self, _count: u64) {}
            fn report_capacity(&self, _bytes: u64) {}
        }

        let clock = Arc::new(TestClock::new());
        let sink = Arc::new(RecordingSink::default());
        let store = WeightedTtlStore::with_meter_sink(
            1024 * 1024,
            clock,
            Some(Arc::clone(&sink) as Arc<dyn MeterSink>),
        );
        let k = key("r1", &[0xEE]);
        store.get(&k);
        store.put(k.clone(), CacheValue::Present(Arc::from(vec![1])), i64::MAX);
        store.get(&k);

        assert_eq!(*sink.hits.lock(), 1);
        assert_eq!(*sink.misses.lock(), 1);
    }
}
