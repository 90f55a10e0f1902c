//! Error types for the KV store abstraction.

use thiserror::Error;

/// Result type for KV operations.
pub type Result<T> = std::result::Result<T, KvError>;

/// Errors surfaced by a [`crate::store::KvStore`] implementation.
///
/// Transport/infrastructure failures (the backing store is unreachable,
/// a query timed out) bubble up through this type to the caller; per
/// spec.md §7 they are never swallowed here — only best-effort cleanup
/// paths (expired-entry eviction) in higher layers swallow them.
#[derive(Debug, Error)]
pub enum KvError {
    /// The backing store could not be reached or returned a transport error.
    #[error("kv store unreachable: {0}")]
    Unreachable(String),

    /// A key was malformed (e.g. an empty key vector).
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A value failed to serialize or deserialize.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic backend-reported failure.
    #[error("kv backend error: {0}")]
    Backend(String),
}
