//! [`ChatModel`] — the provider-agnostic trait every LLM client
//! implements. Minimal by design: the workflows that consume it only
//! ever issue a single-shot completion.

use crate::error::Result;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Default implementation assumes availability; self-hosted
    /// providers should override this with a real health check.
    async fn is_available(&self) -> Result<bool> {
        Ok(true)
    }
}
