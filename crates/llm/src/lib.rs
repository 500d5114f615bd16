//! LLM integration crate for faqbot.
//!
//! Provider-agnostic access to hosted and local language models through a
//! single text-in, text-out trait.
//!
//! # Providers
//! - **Groq** (default) and **OpenAI**: chat completions API
//! - **Ollama**: local runtime
//! - **Mock**: deterministic offline client
//!
//! # Example
//! ```no_run
//! use faqbot_llm::{LlmClient, LlmRequest, providers::ChatCompletionsClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ChatCompletionsClient::groq("gsk-...")?;
//! let request = LlmRequest::new("Hello, world!", "llama3-8b-8192");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{ChatCompletionsClient, MockClient, OllamaClient};
pub use types::ProviderType;
