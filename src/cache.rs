use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::{info, trace};

use crate::builder::{CacheBuilder, CacheConfig};
use crate::entry::{CacheEntry, PutResult};
use crate::listener::{EvictionCause, EvictionListener};
use crate::metrics::stats::{Metrics, StatsCounter};
use crate::policy::EvictionPolicy;
use crate::store::indexed::{Evicted, IndexedStore, WriteOutcome};

// ---------------------------------------------------------------------------
// Cache interior
// ---------------------------------------------------------------------------

/// Shared interior of a [`Cache`].
pub(crate) struct Inner<P: EvictionPolicy> {
    /// Both indices and the byte total, guarded as one unit.
    pub(crate) store: RwLock<IndexedStore<P::State>>,
    pub(crate) policy: P,
    /// Optional eviction listener.  `None` if the user didn't register one.
    pub(crate) listener: Option<Box<dyn EvictionListener>>,
    pub(crate) metrics: StatsCounter,
}

// ---------------------------------------------------------------------------
// Cache handle
// ---------------------------------------------------------------------------

/// A bounded, thread-safe cache of byte buffers.
///
/// Every operation that records an access (`get`, `contains_key`, both puts)
/// takes the exclusive lock, because recording an access reorders the
/// eviction index. `peek` and the size accessors take the shared lock and
/// leave rankings untouched.
///
/// # Example
/// ```
/// use bytecache::{CacheBuilder, LruPolicy};
/// use bytes::Bytes;
///
/// let cache = CacheBuilder::new(LruPolicy).max_entries(2).build().unwrap();
/// cache.put("a", "1");
/// cache.put("b", "2");
/// cache.get(b"a");
/// let result = cache.put("c", "3");
/// assert_eq!(result.evicted_key, Some(Bytes::from_static(b"b")));
/// ```
pub struct Cache<P: EvictionPolicy> {
    inner: Arc<Inner<P>>,
}

impl<P: EvictionPolicy> Clone for Cache<P> {
    fn clone(&self) -> Self {
        Cache {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: EvictionPolicy> Cache<P> {
    pub(crate) fn new(
        policy: P,
        config: CacheConfig,
        listener: Option<Box<dyn EvictionListener>>,
    ) -> Self {
        info!(
            policy = policy.name(),
            max_entries = config.max_entries,
            max_bytes = config.max_bytes,
            "cache created"
        );
        Cache {
            inner: Arc::new(Inner {
                store: RwLock::new(IndexedStore::new(config.max_entries, config.max_bytes)),
                policy,
                listener,
                metrics: StatsCounter::new(),
            }),
        }
    }

    /// Returns a [`CacheBuilder`] for constructing a new cache.
    pub fn builder(policy: P) -> CacheBuilder<P> {
        CacheBuilder::new(policy)
    }

    // -----------------------------------------------------------------------
    // Lookups (record access)
    // -----------------------------------------------------------------------

    /// Returns the value for `key` and records the access with the policy.
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        let value = self
            .inner
            .store
            .write()
            .touch(&self.inner.policy, key)
            .map(|entry| entry.value().clone());

        match value {
            Some(_) => self.inner.metrics.record_hit(),
            None => self.inner.metrics.record_miss(),
        }
        trace!(key_len = key.len(), hit = value.is_some(), "get");
        value
    }

    /// Like [`get`](Cache::get) without returning the value.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        let found = self
            .inner
            .store
            .write()
            .touch(&self.inner.policy, key)
            .is_some();

        if found {
            self.inner.metrics.record_hit();
        } else {
            self.inner.metrics.record_miss();
        }
        found
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Inserts or overwrites `key`.
    ///
    /// The write is accounted first and eviction runs afterwards, so the
    /// entry just written is never its own victim. An entry larger than
    /// `max_bytes` is still stored, alone.
    pub fn put(&self, key: impl Into<Bytes>, value: impl Into<Bytes>) -> PutResult {
        let (key, value) = (key.into(), value.into());
        let outcome = self
            .inner
            .store
            .write()
            .put(&self.inner.policy, key.clone(), value.clone());

        if outcome.inserted {
            self.inner.metrics.record_insert();
        } else {
            self.inner.metrics.record_update();
            trace!(key_len = key.len(), "overwrote cache entry");
        }
        self.finish_write(key, value, outcome)
    }

    /// Inserts `key` only if it is absent, evicting beforehand so the new
    /// entry fits.
    ///
    /// If `key` is present its access is recorded (and counted as a hit)
    /// and nothing else changes; the result has `inserted == false` and the
    /// kept value in `previous_value`.
    ///
    /// An absent entry whose `key.len() + value.len()` exceeds `max_bytes`
    /// is rejected: nothing is evicted or inserted, and the result has
    /// `inserted == false` with no `previous_value`.
    pub fn put_if_absent(&self, key: impl Into<Bytes>, value: impl Into<Bytes>) -> PutResult {
        let (key, value) = (key.into(), value.into());
        let outcome = self
            .inner
            .store
            .write()
            .put_if_absent(&self.inner.policy, key.clone(), value.clone());

        if outcome.inserted {
            self.inner.metrics.record_insert();
        } else if outcome.previous.is_some() {
            self.inner.metrics.record_hit();
        }
        self.finish_write(key, value, outcome)
    }

    fn finish_write(&self, key: Bytes, value: Bytes, outcome: WriteOutcome) -> PutResult {
        self.dispatch_evictions(&outcome.evicted, EvictionCause::Capacity);
        PutResult::new(
            outcome.inserted,
            key,
            value,
            outcome.previous,
            &outcome.evicted,
        )
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    /// Removes `key` and returns its value. Never evicts anything else.
    pub fn remove(&self, key: &[u8]) -> Option<Bytes> {
        let removed = self.inner.store.write().remove(key);
        if let (Some(value), Some(listener)) = (&removed, &self.inner.listener) {
            listener.on_evict(key, value.clone(), EvictionCause::Explicit);
        }
        trace!(key_len = key.len(), found = removed.is_some(), "remove");
        removed
    }

    /// Removes all entries.
    pub fn clear(&self) {
        let drained = self.inner.store.write().clear();
        info!(entries = drained.len(), "cache cleared");
        if let Some(listener) = &self.inner.listener {
            for (key, value) in drained {
                listener.on_evict(&key, value, EvictionCause::Explicit);
            }
        }
    }

    /// Fires the listener for capacity victims and records the metric.
    ///
    /// Runs after the store lock is released.
    fn dispatch_evictions(&self, evicted: &[Evicted], cause: EvictionCause) {
        if evicted.is_empty() {
            return;
        }
        self.inner.metrics.record_eviction(evicted.len() as u64);
        if let Some(listener) = &self.inner.listener {
            for (key, value) in evicted {
                listener.on_evict(key, value.clone(), cause);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Read-only inspection (shared lock, no access recorded)
    // -----------------------------------------------------------------------

    /// Returns the value for `key` without affecting its eviction rank.
    pub fn peek(&self, key: &[u8]) -> Option<Bytes> {
        self.inner.store.read().peek(key).map(|e| e.value().clone())
    }

    /// Snapshot of the full entry for `key`, including policy state.
    pub fn peek_entry(&self, key: &[u8]) -> Option<CacheEntry<P::State>> {
        self.inner.store.read().peek(key).cloned()
    }

    /// Keys in eviction order, next victim first.
    pub fn eviction_order(&self) -> Vec<Bytes> {
        self.inner.store.read().eviction_order()
    }

    pub fn len(&self) -> usize {
        self.inner.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current `Σ (key.len() + value.len())`.
    pub fn total_bytes(&self) -> u64 {
        self.inner.store.read().total_bytes()
    }

    pub fn max_entries(&self) -> usize {
        self.inner.store.read().max_entries()
    }

    pub fn max_bytes(&self) -> u64 {
        self.inner.store.read().max_bytes()
    }

    pub fn policy(&self) -> &P {
        &self.inner.policy
    }

    /// Short name of the eviction policy, e.g. `"lru"`.
    pub fn policy_name(&self) -> &'static str {
        self.inner.policy.name()
    }

    pub fn stats(&self) -> Metrics {
        self.inner.metrics.snapshot()
    }

    /// Verifies that both indices and the byte total agree.
    ///
    /// # Panics
    /// If the cache state has diverged. That is never a recoverable
    /// condition.
    #[doc(hidden)]
    pub fn check_consistency(&self) {
        self.inner.store.read().check_consistency();
    }
}
