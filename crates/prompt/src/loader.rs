//! Prompt loader for YAML prompt definitions.

use crate::types::{PromptDefinition, DEFAULT_QA_PROMPT_ID, QUESTION_VAR, TEXT_VAR};
use faqbot_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Path of a prompt file inside the workspace.
pub fn prompt_path(workspace_path: &Path, prompt_id: &str) -> PathBuf {
    workspace_path
        .join(".faqbot/prompts")
        .join(format!("{}.yml", prompt_id))
}

/// Load a prompt definition by ID from the workspace.
///
/// Looks for `.faqbot/prompts/<id>.yml`. When the file does not exist and
/// `prompt_id` is the built-in `qa.default`, the built-in definition is
/// returned instead.
///
/// # Example
/// ```no_run
/// use faqbot_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "qa.default")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompt_path(workspace_path, prompt_id);

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        if prompt_id == DEFAULT_QA_PROMPT_ID {
            tracing::debug!("No workspace override, using built-in prompt");
            return Ok(PromptDefinition::default_qa());
        }
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    let referenced = referenced_variables(&def.template);
    for required in [TEXT_VAR, QUESTION_VAR] {
        if !referenced.iter().any(|v| v == required) {
            return Err(AppError::Prompt(format!(
                "Prompt '{}' must reference {{{{{}}}}}",
                def.id, required
            )));
        }
    }

    Ok(())
}

/// Names of the simple variables a template references (`{{name}}` / `{{{name}}}`).
fn referenced_variables(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            break;
        };

        let expr = after[..close].trim_start_matches('{').trim();
        if let Some(name) = expr.split_whitespace().next() {
            if !name.starts_with(['#', '/', '!', '>', '^']) {
                names.push(name.trim_matches('~').to_string());
            }
        }

        rest = &after[close + 2..];
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, id: &str, template: &str) -> PathBuf {
        let prompts_dir = dir.join(".faqbot/prompts");
        fs::create_dir_all(&prompts_dir).unwrap();

        let content = format!(
            "id: {}\ntitle: \"Test Prompt\"\napiVersion: \"1.0\"\ncreatedBy: test\ntemplate: \"{}\"\n",
            id, template
        );

        let file_path = prompts_dir.join(format!("{}.yml", id));
        fs::write(&file_path, content).unwrap();
        file_path
    }

    #[test]
    fn test_builtin_fallback() {
        let temp_dir = TempDir::new().unwrap();
        let prompt = load_prompt(temp_dir.path(), DEFAULT_QA_PROMPT_ID).unwrap();
        assert_eq!(prompt.id, DEFAULT_QA_PROMPT_ID);
        assert_eq!(prompt.created_by, "faqbot");
    }

    #[test]
    fn test_workspace_override() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            DEFAULT_QA_PROMPT_ID,
            "Doc: {{text}} Question: {{question}}",
        );

        let prompt = load_prompt(temp_dir.path(), DEFAULT_QA_PROMPT_ID).unwrap();
        assert_eq!(prompt.title, "Test Prompt");
        assert_eq!(prompt.template, "Doc: {{text}} Question: {{question}}");
    }

    #[test]
    fn test_load_nonexistent_prompt() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_prompt(temp_dir.path(), "nonexistent");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let prompts_dir = temp_dir.path().join(".faqbot/prompts");
        fs::create_dir_all(&prompts_dir).unwrap();
        fs::write(prompts_dir.join("broken.yml"), "invalid: yaml: content:").unwrap();

        let result = load_prompt(temp_dir.path(), "broken");
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_template_missing_question() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "no.question", "Summarize: {{text}}");

        let err = load_prompt(temp_dir.path(), "no.question").unwrap_err();
        assert!(err.to_string().contains("{{question}}"));
    }

    #[test]
    fn test_referenced_variables() {
        let vars = referenced_variables("A {{text}} B {{{ question }}} {{#if x}}y{{/if}} {{~text~}}");
        assert_eq!(vars, vec!["text", "question", "text"]);
    }
}
