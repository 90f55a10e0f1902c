//! Error types for the checkpointer.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CheckpointError>;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("kv store error: {0}")]
    Store(#[from] forge_kv::KvError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no checkpoint found for thread {0}")]
    NotFound(String),
}
