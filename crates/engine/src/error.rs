//! Error types for the workflow engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] forge_checkpoint::CheckpointError),

    #[error("pub/sub error: {0}")]
    PubSub(#[from] forge_pubsub::PubSubError),

    /// An unhandled exception during step dispatch (spec.md 4.E.1.4):
    /// something other than a handler reporting its own error, e.g. a
    /// checkpoint write failing mid-loop.
    #[error("unhandled error during step dispatch: {0}")]
    Unhandled(String),
}
