//! Error type for the job service.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("graph validation failed: {0:?}")]
    InvalidGraph(Vec<String>),

    #[error("cache error: {0}")]
    Cache(#[from] forge_cache::CacheError),

    #[error("graph error: {0}")]
    Graph(#[from] forge_graph::GraphError),

    #[error("workflow error: {0}")]
    Workflow(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, JobError>;
