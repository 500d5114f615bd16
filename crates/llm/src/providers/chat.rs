//! OpenAI-compatible chat completions provider.
//!
//! Groq exposes the OpenAI wire format under `/openai/v1`, so one client
//! covers both hosted providers.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use crate::types::ProviderType;
use faqbot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Chat completions client for Groq and OpenAI.
pub struct ChatCompletionsClient {
    provider: ProviderType,

    /// Base URL, without the `/chat/completions` suffix
    base_url: String,

    api_key: String,

    client: reqwest::Client,
}

impl ChatCompletionsClient {
    /// Client for the Groq endpoint.
    pub fn groq(api_key: impl Into<String>) -> AppResult<Self> {
        Self::new(ProviderType::Groq, None, api_key, None)
    }

    /// Client for the OpenAI endpoint.
    pub fn openai(api_key: impl Into<String>) -> AppResult<Self> {
        Self::new(ProviderType::OpenAI, None, api_key, None)
    }

    /// Create a client, falling back to the provider's default base URL.
    pub fn new(
        provider: ProviderType,
        base_url: Option<&str>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> AppResult<Self> {
        let base_url = base_url
            .or_else(|| provider.default_endpoint())
            .ok_or_else(|| {
                AppError::Config(format!("No endpoint for provider {}", provider.as_str()))
            })?
            .trim_end_matches('/')
            .to_string();

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            provider,
            base_url,
            api_key: api_key.into(),
            client,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn to_chat_request(&self, request: &LlmRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(ref system) = request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        ChatCompletionRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        }
    }

    fn convert_response(
        &self,
        request: &LlmRequest,
        response: ChatCompletionResponse,
    ) -> AppResult<LlmResponse> {
        let content = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                AppError::ModelCall(format!(
                    "{} returned no choices",
                    self.provider.as_str()
                ))
            })?;

        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            model: response.model.unwrap_or_else(|| request.model.clone()),
            usage,
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for ChatCompletionsClient {
    fn provider_name(&self) -> &str {
        self.provider.as_str()
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!(provider = self.provider.as_str(), "Sending chat completion request");
        tracing::debug!("Request: {:?}", request);

        let body = self.to_chat_request(request);

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::ModelCall(format!(
                    "Failed to send request to {}: {}",
                    self.provider.as_str(),
                    e
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ModelCall(format!(
                "{} API error ({}): {}",
                self.provider.as_str(),
                status,
                error_text
            )));
        }

        let chat_response: ChatCompletionResponse = response.json().await.map_err(|e| {
            AppError::ModelCall(format!(
                "Failed to parse {} response: {}",
                self.provider.as_str(),
                e
            ))
        })?;

        let converted = self.convert_response(request, chat_response)?;
        tracing::info!(
            provider = self.provider.as_str(),
            total_tokens = converted.usage.total_tokens,
            "Received chat completion"
        );

        Ok(converted)
    }
}
