//! Error type for the session core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cache error: {0}")]
    Cache(#[from] forge_cache::CacheError),

    #[error("missing or malformed Authorization header")]
    MissingBearer,

    #[error("token rejected by issuer: {0}")]
    InvalidToken(String),

    #[error("subject.properties.id is missing, non-integer, or not positive")]
    InvalidSubjectId,

    #[error("no user record for id {0}")]
    UnknownUser(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
