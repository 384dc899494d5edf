//! Error types for cache construction.
//!
//! Only configuration problems are errors. Misses, overwrites and evictions
//! are reported through return values.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building a [`Cache`](crate::Cache).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// `max_entries` was zero
    #[error("max_entries must be greater than 0")]
    ZeroMaxEntries,

    /// `max_bytes` was zero
    #[error("max_bytes must be greater than 0")]
    ZeroMaxBytes,
}
