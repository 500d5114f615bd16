//! Prompt rendering.

use crate::types::{BuiltPrompt, PromptDefinition, QUESTION_VAR, TEXT_VAR};
use faqbot_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

const TEMPLATE_NAME: &str = "prompt";

/// Renders a prompt definition once per chunk.
///
/// The template is compiled when the renderer is created, so syntax errors
/// surface before any document work happens.
///
/// # Example
/// ```
/// use faqbot_prompt::{PromptDefinition, PromptRenderer};
///
/// let renderer = PromptRenderer::new(PromptDefinition::default_qa()).unwrap();
/// let built = renderer.render("Rust is fast.", "Is Rust fast?").unwrap();
/// assert!(built.user.contains("Rust is fast."));
/// ```
pub struct PromptRenderer {
    definition: PromptDefinition,
    handlebars: Handlebars<'static>,
}

impl PromptRenderer {
    /// Compile a prompt definition.
    pub fn new(definition: PromptDefinition) -> AppResult<Self> {
        let mut handlebars = Handlebars::new();

        // Plain text, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);

        handlebars
            .register_template_string(TEMPLATE_NAME, &definition.template)
            .map_err(|e| {
                AppError::Prompt(format!(
                    "Failed to register template '{}': {}",
                    definition.id, e
                ))
            })?;

        Ok(Self {
            definition,
            handlebars,
        })
    }

    /// Prompt identifier.
    pub fn prompt_id(&self) -> &str {
        &self.definition.id
    }

    /// Substitute the chunk text and the question into the template.
    ///
    /// The question is passed through verbatim.
    pub fn render(&self, text: &str, question: &str) -> AppResult<BuiltPrompt> {
        let mut variables = HashMap::with_capacity(2);
        variables.insert(TEXT_VAR, text);
        variables.insert(QUESTION_VAR, question);

        let user = self
            .handlebars
            .render(TEMPLATE_NAME, &variables)
            .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

        Ok(BuiltPrompt {
            system: self.definition.system.clone(),
            user,
            source_prompt_id: self.definition.id.clone(),
        })
    }
}
