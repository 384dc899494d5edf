//! Eviction listener — a callback invoked whenever an entry leaves the cache.
//!
//! # Example
//! ```
//! use bytecache::listener::EvictionCause;
//! use bytecache::{CacheBuilder, LruPolicy};
//! use bytes::Bytes;
//! use std::sync::{Arc, Mutex};
//!
//! let log: Arc<Mutex<Vec<(Vec<u8>, EvictionCause)>>> = Arc::new(Mutex::new(Vec::new()));
//! let log2 = Arc::clone(&log);
//!
//! let cache = CacheBuilder::new(LruPolicy)
//!     .max_entries(2)
//!     .eviction_listener(move |key: &[u8], _val, cause| {
//!         log2.lock().unwrap().push((key.to_vec(), cause));
//!     })
//!     .build()
//!     .unwrap();
//!
//! cache.put(Bytes::from_static(b"a"), Bytes::from_static(b"1"));
//! cache.put(Bytes::from_static(b"b"), Bytes::from_static(b"2"));
//! cache.put(Bytes::from_static(b"c"), Bytes::from_static(b"3")); // capacity eviction
//! cache.remove(b"b"); // explicit removal
//! assert_eq!(log.lock().unwrap().len(), 2);
//! ```

use bytes::Bytes;

/// The reason an entry was removed from the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvictionCause {
    /// Chosen as the victim because a capacity bound was exceeded.
    Capacity,
    /// Removed via [`Cache::remove`] or [`Cache::clear`].
    ///
    /// [`Cache::remove`]: crate::Cache::remove
    /// [`Cache::clear`]: crate::Cache::clear
    Explicit,
}

/// A callback invoked each time an entry is evicted or removed.
///
/// Listeners run on the calling thread **after** the cache lock has been
/// released, so they may call back into the cache. They must not panic; a
/// panicking listener unwinds into the caller of the cache operation.
pub trait EvictionListener: Send + Sync + 'static {
    fn on_evict(&self, key: &[u8], value: Bytes, cause: EvictionCause);
}

/// An [`EvictionListener`] backed by a closure.
///
/// Created via [`CacheBuilder::eviction_listener`](crate::CacheBuilder::eviction_listener).
pub struct FnListener<F>(pub F);

impl<F> EvictionListener for FnListener<F>
where
    F: Fn(&[u8], Bytes, EvictionCause) + Send + Sync + 'static,
{
    fn on_evict(&self, key: &[u8], value: Bytes, cause: EvictionCause) {
        (self.0)(key, value, cause)
    }
}
