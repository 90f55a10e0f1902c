//! Error types for the pub/sub bus.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PubSubError>;

#[derive(Debug, Error)]
pub enum PubSubError {
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}
