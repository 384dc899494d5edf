pub mod fifo;
pub mod lfu;
pub mod lru;

use std::fmt::Debug;

/// Eviction strategy: ranks entries and updates their ranking on access.
///
/// A policy holds no cache state. Everything it needs to rank an entry lives
/// in the entry's [`State`](EvictionPolicy::State), and the cache passes a
/// logical `tick` (bumped on every insertion and recorded access) so recency
/// can be expressed without a clock.
///
/// Entries with the *smallest* state are evicted first. Equal states are
/// tie-broken by insertion sequence, so the order the cache sees is always
/// total.
///
/// The cache calls [`on_access`](EvictionPolicy::on_access) only after taking
/// the entry out of its ordered index, and re-inserts it afterwards.
/// Implementations never see an indexed state being mutated.
pub trait EvictionPolicy: Send + Sync + 'static {
    /// Per-entry ranking metadata. Only the policy interprets it.
    type State: Ord + Clone + Debug + Send + Sync + 'static;

    /// Short name used in log events.
    fn name(&self) -> &'static str;

    /// State for an entry inserted at `tick`.
    fn initial_state(&self, tick: u64) -> Self::State;

    /// Records a hit on an existing entry at `tick`.
    fn on_access(&self, state: &mut Self::State, tick: u64);
}

/// Key of the ordered (eviction) index.
///
/// Orders by policy state first, then by the entry's unique insertion
/// sequence number.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rank<S> {
    pub(crate) state: S,
    pub(crate) seq: u64,
}

impl<S> Rank<S> {
    pub(crate) fn new(state: S, seq: u64) -> Self {
        Rank { state, seq }
    }

    /// The policy state this rank was built from.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Insertion sequence number of the ranked entry.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}
