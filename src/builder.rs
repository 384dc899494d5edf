use crate::cache::Cache;
use crate::error::{Error, Result};
use crate::listener::{EvictionCause, EvictionListener, FnListener};
use crate::policy::EvictionPolicy;

use bytes::Bytes;

/// Default entry-count bound.
pub const DEFAULT_MAX_ENTRIES: usize = 10;

/// Default byte bound (5 MiB).
pub const DEFAULT_MAX_BYTES: u64 = 5_242_880;

/// Capacity limits of a cache. Both are fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CacheConfig {
    /// Maximum number of entries.
    pub max_entries: usize,
    /// Maximum `Σ (key.len() + value.len())` over all entries.
    pub max_bytes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(Error::ZeroMaxEntries);
        }
        if self.max_bytes == 0 {
            return Err(Error::ZeroMaxBytes);
        }
        Ok(())
    }
}

/// Builder for configuring and constructing a [`Cache`].
///
/// The eviction policy is the one required input, so it is taken up front.
///
/// # Example
/// ```
/// use bytecache::{CacheBuilder, LfuPolicy};
///
/// let cache = CacheBuilder::new(LfuPolicy)
///     .max_entries(1_000)
///     .max_bytes(64 * 1024 * 1024)
///     .build()
///     .expect("valid limits");
/// assert_eq!(cache.max_entries(), 1_000);
/// ```
pub struct CacheBuilder<P> {
    policy: P,
    config: CacheConfig,
    listener: Option<Box<dyn EvictionListener>>,
}

impl<P: EvictionPolicy> CacheBuilder<P> {
    pub fn new(policy: P) -> Self {
        Self::with_config(policy, CacheConfig::default())
    }

    pub fn with_config(policy: P, config: CacheConfig) -> Self {
        CacheBuilder {
            policy,
            config,
            listener: None,
        }
    }

    /// Maximum number of entries (default: 10).
    pub fn max_entries(mut self, n: usize) -> Self {
        self.config.max_entries = n;
        self
    }

    /// Maximum total key + value bytes (default: 5 MiB).
    pub fn max_bytes(mut self, n: u64) -> Self {
        self.config.max_bytes = n;
        self
    }

    /// Register an eviction listener closure.
    ///
    /// Called after the operation that removed the entry has released the
    /// cache lock, once per removed entry.
    pub fn eviction_listener<F>(mut self, f: F) -> Self
    where
        F: Fn(&[u8], Bytes, EvictionCause) + Send + Sync + 'static,
    {
        self.listener = Some(Box::new(FnListener(f)));
        self
    }

    /// Register an eviction listener via the [`EvictionListener`] trait.
    pub fn eviction_listener_impl<L: EvictionListener>(mut self, l: L) -> Self {
        self.listener = Some(Box::new(l));
        self
    }

    /// Validates the limits and builds the cache.
    pub fn build(self) -> Result<Cache<P>> {
        self.config.validate()?;
        Ok(Cache::new(self.policy, self.config, self.listener))
    }
}
