use super::EvictionPolicy;

/// First-in-first-out: evicts in insertion order and ignores accesses.
///
/// The state is empty; the ordered index falls back entirely to the
/// insertion sequence number.
#[derive(Clone, Copy, Debug, Default)]
pub struct FifoPolicy;

impl FifoPolicy {
    pub fn new() -> Self {
        FifoPolicy
    }
}

impl EvictionPolicy for FifoPolicy {
    type State = ();

    fn name(&self) -> &'static str {
        "fifo"
    }

    #[inline]
    fn initial_state(&self, _tick: u64) {}

    #[inline]
    fn on_access(&self, _state: &mut (), _tick: u64) {}
}
