//! [`FakeChatModel`] — a scripted test double recording call count,
//! backing the cache-hit short-circuit scenario (only the second
//! `submitJob` for identical content must *not* reach the provider).

use crate::error::{LlmError, Result};
use crate::model::ChatModel;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub struct FakeChatModel {
    responses: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl FakeChatModel {
    /// Each call to `chat` pops the next scripted response in order. The
    /// last response is reused once the queue is exhausted.
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatModel for FakeChatModel {
    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut responses = self.responses.lock().unwrap();
        let content = if responses.len() > 1 {
            responses.remove(0)
        } else {
            responses
                .first()
                .cloned()
                .ok_or_else(|| LlmError::Provider("FakeChatModel has no scripted response".into()))?
        };

        Ok(ChatResponse {
            content,
            usage: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_call_count() {
        let model = FakeChatModel::new(vec!["hi".to_string()]);
        assert_eq!(model.call_count(), 0);
        model.chat(ChatRequest::new(vec![])).await.unwrap();
        model.chat(ChatRequest::new(vec![])).await.unwrap();
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn cycles_through_scripted_responses() {
        let model = FakeChatModel::new(vec!["first".to_string(), "second".to_string()]);
        let r1 = model.chat(ChatRequest::new(vec![])).await.unwrap();
        let r2 = model.chat(ChatRequest::new(vec![])).await.unwrap();
        assert_eq!(r1.content, "first");
        assert_eq!(r2.content, "second");
    }
}
