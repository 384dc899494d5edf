mod builder;
mod cache;
mod entry;
mod error;
mod metrics;
mod store;
pub mod listener;
pub mod policy;

pub use builder::{CacheBuilder, CacheConfig, DEFAULT_MAX_BYTES, DEFAULT_MAX_ENTRIES};
pub use cache::Cache;
pub use entry::{CacheEntry, PutResult};
pub use error::{Error, Result};
pub use metrics::stats::Metrics;
pub use policy::fifo::FifoPolicy;
pub use policy::lfu::{LfuPolicy, LfuState};
pub use policy::lru::LruPolicy;
pub use policy::{EvictionPolicy, Rank};
