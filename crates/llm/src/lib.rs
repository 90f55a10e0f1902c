//! `forge-llm` — a provider-agnostic chat model trait plus an
//! OpenAI-compatible HTTP client and a scripted fake for tests.

pub mod error;
pub mod fake;
pub mod model;
pub mod openai_compatible;
pub mod types;

pub use error::{LlmError, Result};
pub use fake::FakeChatModel;
pub use model::ChatModel;
pub use openai_compatible::{OpenAiCompatibleClient, OpenAiCompatibleConfig};
pub use types::{ChatMessage, ChatRequest, ChatResponse, ChatRole, UsageMetadata};
