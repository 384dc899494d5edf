use std::collections::BTreeMap;

use ahash::AHashMap;
use bytes::Bytes;
use tracing::debug;

use crate::entry::{weigh, CacheEntry};
use crate::policy::{EvictionPolicy, Rank};

/// A `(key, value)` pair removed by the store.
pub(crate) type Evicted = (Bytes, Bytes);

/// What a write did to the store.
pub(crate) struct WriteOutcome {
    pub(crate) inserted: bool,
    pub(crate) previous: Option<Bytes>,
    pub(crate) evicted: Vec<Evicted>,
}

// ---------------------------------------------------------------------------
// IndexedStore
// ---------------------------------------------------------------------------

/// Forward index, eviction-ordered index and byte total, kept in lock-step.
///
/// Not synchronised: the cache owns one behind a single `RwLock` and every
/// method here runs with that lock held. After any method returns,
/// `forward` and `ordered` hold the same keys one-to-one and `total_bytes`
/// is the sum of entry sizes.
///
/// An entry's rank is never mutated while it sits in `ordered`; every access
/// removes the old rank, updates the state, then re-inserts.
pub(crate) struct IndexedStore<S> {
    forward: AHashMap<Bytes, CacheEntry<S>>,
    ordered: BTreeMap<Rank<S>, Bytes>,
    total_bytes: u64,
    max_entries: usize,
    max_bytes: u64,
    /// Next insertion sequence number (tie-breaker in `Rank`).
    next_seq: u64,
    /// Logical clock handed to the policy.
    tick: u64,
}

impl<S: Ord + Clone> IndexedStore<S> {
    pub(crate) fn new(max_entries: usize, max_bytes: u64) -> Self {
        IndexedStore {
            forward: AHashMap::new(),
            ordered: BTreeMap::new(),
            total_bytes: 0,
            max_entries,
            max_bytes,
            next_seq: 0,
            tick: 0,
        }
    }

    #[inline]
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    // -----------------------------------------------------------------------
    // Access-recording operations
    // -----------------------------------------------------------------------

    /// Looks up `key` and records the access with the policy.
    pub(crate) fn touch<P>(&mut self, policy: &P, key: &[u8]) -> Option<&CacheEntry<S>>
    where
        P: EvictionPolicy<State = S>,
    {
        let entry = self.forward.get_mut(key)?;
        self.tick += 1;
        let tick = self.tick;

        let owner = self.ordered.remove(&entry.rank());
        debug_assert!(owner.is_some(), "entry missing from ordered index");
        policy.on_access(entry.state_mut(), tick);
        self.ordered.insert(entry.rank(), entry.key().clone());

        Some(&*entry)
    }

    /// Unconditional upsert. Evicts afterwards, never the entry just written.
    pub(crate) fn put<P>(&mut self, policy: &P, key: Bytes, value: Bytes) -> WriteOutcome
    where
        P: EvictionPolicy<State = S>,
    {
        let tick = self.next_tick();
        let previous = match self.forward.get_mut(&key) {
            Some(entry) => {
                self.ordered.remove(&entry.rank());
                let old_size = entry.size();
                let old_value = entry.replace_value(value);
                self.total_bytes = self.total_bytes - old_size + entry.size();
                policy.on_access(entry.state_mut(), tick);
                self.ordered.insert(entry.rank(), entry.key().clone());
                Some(old_value)
            }
            None => {
                self.insert_new(policy, key.clone(), value, tick);
                None
            }
        };

        let evicted = self.evict_over_limits(&key, policy.name());
        self.debug_check_cardinality();

        WriteOutcome {
            inserted: previous.is_none(),
            previous,
            evicted,
        }
    }

    /// Inserts only if `key` is absent, making room first.
    ///
    /// A present key gets an access recorded and is otherwise left alone:
    /// its value, size and the byte total do not change. An absent entry
    /// larger than `max_bytes` can never fit and is rejected without
    /// evicting anything.
    pub(crate) fn put_if_absent<P>(&mut self, policy: &P, key: Bytes, value: Bytes) -> WriteOutcome
    where
        P: EvictionPolicy<State = S>,
    {
        if let Some(entry) = self.touch(policy, &key) {
            return WriteOutcome {
                inserted: false,
                previous: Some(entry.value().clone()),
                evicted: Vec::new(),
            };
        }

        let incoming = weigh(&key, &value);
        if incoming > self.max_bytes {
            debug!(
                key_len = key.len(),
                size = incoming,
                max_bytes = self.max_bytes,
                "rejected entry larger than max_bytes"
            );
            return WriteOutcome {
                inserted: false,
                previous: None,
                evicted: Vec::new(),
            };
        }

        let evicted = self.evict_to_fit(incoming, policy.name());
        let tick = self.next_tick();
        self.insert_new(policy, key, value, tick);
        self.debug_check_cardinality();

        WriteOutcome {
            inserted: true,
            previous: None,
            evicted,
        }
    }

    fn insert_new<P>(&mut self, policy: &P, key: Bytes, value: Bytes, tick: u64)
    where
        P: EvictionPolicy<State = S>,
    {
        let seq = self.next_seq;
        self.next_seq += 1;
        let entry = CacheEntry::new(key.clone(), value, seq, policy.initial_state(tick));
        self.total_bytes += entry.size();
        self.ordered.insert(entry.rank(), key.clone());
        self.forward.insert(key, entry);
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    pub(crate) fn remove(&mut self, key: &[u8]) -> Option<Bytes> {
        let entry = self.forward.remove(key)?;
        let owner = self.ordered.remove(&entry.rank());
        debug_assert!(owner.is_some(), "entry missing from ordered index");
        self.total_bytes -= entry.size();
        self.debug_check_cardinality();
        Some(entry.into_value())
    }

    /// Drops every entry and returns them in no particular order.
    pub(crate) fn clear(&mut self) -> Vec<Evicted> {
        self.ordered.clear();
        self.total_bytes = 0;
        self.forward
            .drain()
            .map(|(key, entry)| (key, entry.into_value()))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Eviction
    // -----------------------------------------------------------------------

    #[inline]
    fn over_limits(&self) -> bool {
        self.forward.len() > self.max_entries || self.total_bytes > self.max_bytes
    }

    /// Soft bound: evicts while either limit is exceeded, skipping `protect`.
    fn evict_over_limits(&mut self, protect: &[u8], policy: &'static str) -> Vec<Evicted> {
        let mut evicted = Vec::new();
        while self.over_limits() {
            match self.pop_victim(Some(protect), policy) {
                Some(victim) => evicted.push(victim),
                None => break,
            }
        }
        evicted
    }

    /// Hard bound: evicts until an entry of `incoming` bytes fits.
    ///
    /// Callers guarantee `incoming <= max_bytes`.
    fn evict_to_fit(&mut self, incoming: u64, policy: &'static str) -> Vec<Evicted> {
        let mut evicted = Vec::new();
        while !self.forward.is_empty()
            && (self.forward.len() >= self.max_entries
                || self.total_bytes.saturating_add(incoming) > self.max_bytes)
        {
            match self.pop_victim(None, policy) {
                Some(victim) => evicted.push(victim),
                None => break,
            }
        }
        evicted
    }

    /// Removes the lowest-ranked entry other than `protect`.
    fn pop_victim(&mut self, protect: Option<&[u8]>, policy: &'static str) -> Option<Evicted> {
        let rank = self
            .ordered
            .iter()
            .find(|(_, key)| protect.map_or(true, |p| &key[..] != p))
            .map(|(rank, _)| rank.clone())?;
        let key = self.ordered.remove(&rank)?;
        let Some(entry) = self.forward.remove(&key) else {
            panic!("ordered index references a key missing from the forward index");
        };
        self.total_bytes -= entry.size();

        debug!(
            policy,
            key_len = key.len(),
            freed_bytes = entry.size(),
            entries = self.forward.len(),
            bytes = self.total_bytes,
            "evicted cache entry"
        );
        Some((key, entry.into_value()))
    }

    // -----------------------------------------------------------------------
    // Read-only inspection
    // -----------------------------------------------------------------------

    pub(crate) fn peek(&self, key: &[u8]) -> Option<&CacheEntry<S>> {
        self.forward.get(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.forward.len()
    }

    pub(crate) fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub(crate) fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub(crate) fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Keys from next victim to last.
    pub(crate) fn eviction_order(&self) -> Vec<Bytes> {
        self.ordered.values().cloned().collect()
    }

    #[inline]
    fn debug_check_cardinality(&self) {
        debug_assert_eq!(
            self.forward.len(),
            self.ordered.len(),
            "forward and ordered indices diverged"
        );
    }

    /// Full structural check. Panics on any divergence.
    pub(crate) fn check_consistency(&self) {
        assert_eq!(
            self.forward.len(),
            self.ordered.len(),
            "forward and ordered indices diverged"
        );
        let mut sum = 0u64;
        for (key, entry) in self.forward.iter() {
            assert_eq!(
                self.ordered.get(&entry.rank()),
                Some(key),
                "entry not indexed under its current rank"
            );
            assert_eq!(entry.size(), weigh(entry.key(), entry.value()), "stale entry size");
            sum += entry.size();
        }
        assert_eq!(sum, self.total_bytes, "byte total does not match entries");
    }
}
