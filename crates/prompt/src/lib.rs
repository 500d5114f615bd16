//! Prompt system for faqbot.
//!
//! - YAML prompt definitions, overridable per workspace
//! - Handlebars rendering of the `{{text}}` / `{{question}}` template

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::PromptRenderer;
pub use loader::{load_prompt, prompt_path};
pub use types::{BuiltPrompt, PromptDefinition, DEFAULT_QA_PROMPT_ID, DEFAULT_QA_TEMPLATE};
