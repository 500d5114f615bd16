//! LLM provider implementations.

mod chat;
mod mock;
mod ollama;

pub use chat::ChatCompletionsClient;
pub use mock::MockClient;
pub use ollama::OllamaClient;
