//! Error types for LLM provider clients.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LlmError>;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication error: {0}")]
    Authentication(String),

    #[error("rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
