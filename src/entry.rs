use bytes::Bytes;

use crate::policy::Rank;

/// A cached key/value pair plus the bookkeeping the engine and policy need.
///
/// `size` is always `key.len() + value.len()` as of the last write.
#[derive(Clone, Debug)]
pub struct CacheEntry<S> {
    key: Bytes,
    value: Bytes,
    size: u64,
    seq: u64,
    state: S,
}

impl<S: Clone> CacheEntry<S> {
    pub(crate) fn new(key: Bytes, value: Bytes, seq: u64, state: S) -> Self {
        let size = weigh(&key, &value);
        CacheEntry {
            key,
            value,
            size,
            seq,
            state,
        }
    }

    pub fn key(&self) -> &Bytes {
        &self.key
    }

    pub fn value(&self) -> &Bytes {
        &self.value
    }

    /// Bytes charged against `max_bytes`.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Unique insertion sequence number.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Policy-owned ranking metadata.
    pub fn state(&self) -> &S {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// Swaps in a new value and returns the old one. Size is recomputed.
    pub(crate) fn replace_value(&mut self, value: Bytes) -> Bytes {
        self.size = weigh(&self.key, &value);
        std::mem::replace(&mut self.value, value)
    }

    pub(crate) fn into_value(self) -> Bytes {
        self.value
    }

    pub(crate) fn rank(&self) -> Rank<S> {
        Rank::new(self.state.clone(), self.seq)
    }
}

#[inline]
pub(crate) fn weigh(key: &[u8], value: &[u8]) -> u64 {
    (key.len() + value.len()) as u64
}

// ---------------------------------------------------------------------------
// PutResult
// ---------------------------------------------------------------------------

/// Outcome of a single `put` or `put_if_absent`.
///
/// `previous_value` is set when the key already existed: for `put` it is the
/// overwritten value, for `put_if_absent` it is the value that was kept.
/// `evicted_key`/`evicted_value` describe the first victim removed to make
/// room; `evicted_count` counts all of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PutResult {
    pub inserted: bool,
    pub key: Bytes,
    pub value: Bytes,
    pub previous_value: Option<Bytes>,
    pub evicted_key: Option<Bytes>,
    pub evicted_value: Option<Bytes>,
    pub evicted_count: usize,
}

impl PutResult {
    pub(crate) fn new(
        inserted: bool,
        key: Bytes,
        value: Bytes,
        previous_value: Option<Bytes>,
        evicted: &[(Bytes, Bytes)],
    ) -> Self {
        let first = evicted.first();
        PutResult {
            inserted,
            key,
            value,
            previous_value,
            evicted_key: first.map(|(k, _)| k.clone()),
            evicted_value: first.map(|(_, v)| v.clone()),
            evicted_count: evicted.len(),
        }
    }

    /// `true` if at least one entry was evicted by this call.
    pub fn evicted(&self) -> bool {
        self.evicted_count > 0
    }
}
