//! [`OpenAiCompatibleClient`] — an HTTP client for the OpenAI chat
//! completions wire format, which most hosted and self-hosted providers
//! (OpenAI itself, most local inference servers) speak.

use crate::error::{LlmError, Result};
use crate::model::ChatModel;
use crate::types::{ChatRequest, ChatResponse, ChatRole, UsageMetadata};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl OpenAiCompatibleConfig {
    /// Load from the environment the way `forge_tooling::config` helpers
    /// expect: `<PREFIX>_API_KEY`, `<PREFIX>_BASE_URL`, `<PREFIX>_MODEL`.
    pub fn from_env(prefix: &str) -> forge_tooling::Result<Self> {
        let api_key = forge_tooling::config::get_env(&format!("{prefix}_API_KEY"))?
            .ok_or_else(|| forge_tooling::ToolingError::General(format!("{prefix}_API_KEY not set")))?;
        let base_url = forge_tooling::config::get_env_or(
            &format!("{prefix}_BASE_URL"),
            "https://api.openai.com/v1",
        )?;
        let model = forge_tooling::config::get_env_or(&format!("{prefix}_MODEL"), "gpt-4o-mini")?;
        Ok(Self {
            base_url,
            api_key,
            model,
            timeout: Duration::from_secs(30),
        })
    }
}

#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    config: OpenAiCompatibleConfig,
    client: Client,
}

impl OpenAiCompatibleClient {
    pub fn new(config: OpenAiCompatibleConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to build HTTP client");
        Self { config, client }
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatibleClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let body = WireRequest {
            model: self.config.model.clone(),
            messages: request.messages.iter().map(WireMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => LlmError::Authentication(text),
                429 => LlmError::RateLimit(text),
                _ => LlmError::Provider(format!("{status}: {text}")),
            });
        }

        let parsed: WireResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("no choices in response".into()))?;

        Ok(ChatResponse {
            content: choice.message.content,
            usage: parsed.usage.map(|u| UsageMetadata {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            }),
        })
    }
}

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

impl From<&crate::types::ChatMessage> for WireMessage {
    fn from(msg: &crate::types::ChatMessage) -> Self {
        Self {
            role: match msg.role {
                ChatRole::System => "system".to_string(),
                ChatRole::User => "user".to_string(),
                ChatRole::Assistant => "assistant".to_string(),
            },
            content: msg.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
