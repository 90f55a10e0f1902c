//! Error type for the MCP processor.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum McpError {
    #[error("malformed MCP frame: {0}")]
    Malformed(String),

    #[error("job error: {0}")]
    Job(#[from] forge_jobs::JobError),

    #[error("graph store error: {0}")]
    Store(#[from] forge_workflows::WorkflowError),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, McpError>;
