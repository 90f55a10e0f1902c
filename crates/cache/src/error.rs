//! Error types for the write-through cache.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CacheError>;

#[derive(Debug, Error)]
pub enum CacheError {
    /// The underlying L2 store failed.
    #[error("L2 store error: {0}")]
    Store(#[from] forge_kv::KvError),
}
