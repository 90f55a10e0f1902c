//! Error type for the plan and codegen workflows.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("llm error: {0}")]
    Llm(#[from] forge_llm::LlmError),

    #[error("graph error: {0}")]
    Graph(#[from] forge_graph::GraphError),

    #[error("graph store error: {0}")]
    Store(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
