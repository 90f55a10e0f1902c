//! Error types for the graph model and its rule-table utilities.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("tooling error: {0}")]
    Tooling(#[from] forge_tooling::ToolingError),
}
