//! Error types for faqbot.
//!
//! A single error enum covers every failure the tool can report: document
//! ingestion, missing user input, model calls, plus the configuration,
//! I/O and prompt errors of the surrounding plumbing.

use thiserror::Error;

/// Unified error type for faqbot.
///
/// All fallible functions return `Result<T, AppError>`. Nothing is retried;
/// every variant is surfaced to the user as-is.
#[derive(Error, Debug)]
pub enum AppError {
    /// Unrecognized file extension or format tag
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Malformed document content (bad UTF-8, unreadable PDF, ...)
    #[error("Failed to parse document: {0}")]
    ParseFailure(String),

    /// No document text available when a question was submitted
    #[error("Please provide a document first (no text to query)")]
    MissingInput,

    /// Empty or whitespace-only question
    #[error("Please enter a question")]
    MissingQuestion,

    /// The hosted model call failed (auth, timeout, network, bad response)
    #[error("Model call failed: {0}")]
    ModelCall(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Whether this error is a user-input condition checked before any
    /// external call (reported as a warning rather than a failure).
    pub fn is_user_input(&self) -> bool {
        matches!(self, AppError::MissingInput | AppError::MissingQuestion)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_input_classification() {
        assert!(AppError::MissingInput.is_user_input());
        assert!(AppError::MissingQuestion.is_user_input());
        assert!(!AppError::ModelCall("timeout".to_string()).is_user_input());
        assert!(!AppError::ParseFailure("bad pdf".to_string()).is_user_input());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }
}
