//! Deterministic offline provider.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use faqbot_core::{AppError, AppResult};
use std::sync::Mutex;

/// Mock provider for tests and offline runs.
///
/// Without scripted answers it echoes a short digest of each prompt, so
/// the output still reflects which chunk was asked about. Every prompt is
/// recorded in call order.
#[derive(Debug, Default)]
pub struct MockClient {
    answers: Vec<String>,
    fail_on_call: Option<usize>,
    prompts: Mutex<Vec<String>>,
}

impl MockClient {
    /// Echoing mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the n-th call with the n-th scripted answer (cycling).
    pub fn with_answers<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Fail the call with this 0-based index.
    pub fn failing_on(mut self, call_index: usize) -> Self {
        self.fail_on_call = Some(call_index);
        self
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    /// Number of calls received, including failed ones.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    fn echo(prompt: &str) -> String {
        let chars = prompt.chars().count();
        let head: String = prompt.chars().take(48).collect();
        format!("[mock] {} chars: {}", chars, head)
    }
}

#[async_trait::async_trait]
impl LlmClient for MockClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let index = {
            let mut prompts = self
                .prompts
                .lock()
                .map_err(|_| AppError::ModelCall("mock state poisoned".to_string()))?;
            prompts.push(request.prompt.clone());
            prompts.len() - 1
        };

        if self.fail_on_call == Some(index) {
            return Err(AppError::ModelCall(format!(
                "mock failure on call {}",
                index
            )));
        }

        let content = if self.answers.is_empty() {
            Self::echo(&request.prompt)
        } else {
            self.answers[index % self.answers.len()].clone()
        };

        let prompt_tokens = request.prompt.split_whitespace().count() as u32;
        let completion_tokens = content.split_whitespace().count() as u32;

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::new(prompt_tokens, completion_tokens),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_answers_in_order() {
        let client = MockClient::with_answers(["first", "second"]);
        let request = LlmRequest::new("prompt", "mock-model");

        assert_eq!(client.complete(&request).await.unwrap().content, "first");
        assert_eq!(client.complete(&request).await.unwrap().content, "second");
        assert_eq!(client.complete(&request).await.unwrap().content, "first");
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_echo_mode() {
        let client = MockClient::new();
        let response = client
            .complete(&LlmRequest::new("What is Rust?", "mock-model"))
            .await
            .unwrap();
        assert_eq!(response.content, "[mock] 13 chars: What is Rust?");
        assert_eq!(client.prompts(), vec!["What is Rust?".to_string()]);
    }

    #[tokio::test]
    async fn test_forced_failure() {
        let client = MockClient::new().failing_on(1);
        let request = LlmRequest::new("prompt", "mock-model");

        assert!(client.complete(&request).await.is_ok());
        let err = client.complete(&request).await.unwrap_err();
        assert!(matches!(err, AppError::ModelCall(_)));
        assert_eq!(client.call_count(), 2);
    }
}
