use super::EvictionPolicy;

/// Per-entry metadata for [`LfuPolicy`].
///
/// Field order matters: the derived `Ord` compares `hits` first and falls
/// back to recency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct LfuState {
    pub hits: u64,
    pub last_access: u64,
}

/// Least-frequently-used: the entry with the fewest recorded hits goes
/// first, and among equally cold entries the least recently touched one.
#[derive(Clone, Copy, Debug, Default)]
pub struct LfuPolicy;

impl LfuPolicy {
    pub fn new() -> Self {
        LfuPolicy
    }
}

impl EvictionPolicy for LfuPolicy {
    type State = LfuState;

    fn name(&self) -> &'static str {
        "lfu"
    }

    #[inline]
    fn initial_state(&self, tick: u64) -> LfuState {
        LfuState {
            hits: 0,
            last_access: tick,
        }
    }

    #[inline]
    fn on_access(&self, state: &mut LfuState, tick: u64) {
        state.hits = state.hits.saturating_add(1);
        state.last_access = tick;
    }
}
