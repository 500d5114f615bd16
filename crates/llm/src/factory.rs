//! LLM provider factory.
//!
//! Builds a client from the provider name and the credentials resolved at
//! startup. Nothing here reads the environment.

use crate::client::LlmClient;
use crate::providers::{ChatCompletionsClient, MockClient, OllamaClient};
use crate::types::ProviderType;
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("groq", "openai", "ollama", "mock")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key for hosted providers
/// * `timeout` - Optional per-request timeout
///
/// # Errors
/// Returns an error if the provider is unknown, a required API key is
/// missing, or the HTTP client cannot be built.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Option<Duration>,
) -> Result<Arc<dyn LlmClient>, String> {
    let provider_type =
        ProviderType::parse(provider).ok_or_else(|| format!("Unknown provider: {}", provider))?;

    if provider_type.requires_api_key() && api_key.is_none() {
        return Err(format!(
            "{} provider requires API key",
            provider_type.as_str()
        ));
    }

    match provider_type {
        ProviderType::Groq | ProviderType::OpenAI => {
            let api_key = api_key.unwrap_or_default();
            let client = ChatCompletionsClient::new(provider_type, endpoint, api_key, timeout)
                .map_err(|e| e.to_string())?;
            Ok(Arc::new(client))
        }
        ProviderType::Ollama => {
            let base_url = endpoint
                .or_else(|| provider_type.default_endpoint())
                .unwrap_or("http://localhost:11434");
            let client = OllamaClient::with_base_url(base_url);
            let client = match timeout {
                Some(timeout) => client.with_timeout(timeout).map_err(|e| e.to_string())?,
                None => client,
            };
            Ok(Arc::new(client))
        }
        ProviderType::Mock => Ok(Arc::new(MockClient::new())),
    }
}
