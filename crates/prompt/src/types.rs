//! Prompt types.

use serde::{Deserialize, Serialize};

/// Identifier of the built-in question-answering prompt.
pub const DEFAULT_QA_PROMPT_ID: &str = "qa.default";

/// Template used when the workspace does not override it.
pub const DEFAULT_QA_TEMPLATE: &str = "Here is the text: {{text}}. Answer the following question based on the given text: {{question}}.";

/// Variable carrying the chunk text.
pub const TEXT_VAR: &str = "text";

/// Variable carrying the user's question.
pub const QUESTION_VAR: &str = "question";

/// A prompt definition loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Optional system message sent alongside the rendered template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Template string with Handlebars syntax; must use `{{text}}` and `{{question}}`
    pub template: String,
}

impl PromptDefinition {
    /// The built-in question-answering prompt.
    pub fn default_qa() -> Self {
        Self {
            id: DEFAULT_QA_PROMPT_ID.to_string(),
            title: "Answer a question from document text".to_string(),
            api_version: "1.0".to_string(),
            created_by: "faqbot".to_string(),
            system: None,
            template: DEFAULT_QA_TEMPLATE.to_string(),
        }
    }
}

/// A fully built prompt ready for LLM execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System message (optional)
    pub system: Option<String>,

    /// User message (required)
    pub user: String,

    /// Source prompt ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,
}
