use super::EvictionPolicy;

/// Least-recently-used: the entry with the oldest access tick goes first.
///
/// State is the tick of the last insertion or recorded access.
#[derive(Clone, Copy, Debug, Default)]
pub struct LruPolicy;

impl LruPolicy {
    pub fn new() -> Self {
        LruPolicy
    }
}

impl EvictionPolicy for LruPolicy {
    type State = u64;

    fn name(&self) -> &'static str {
        "lru"
    }

    #[inline]
    fn initial_state(&self, tick: u64) -> u64 {
        tick
    }

    #[inline]
    fn on_access(&self, state: &mut u64, tick: u64) {
        *state = tick;
    }
}
