//! Document and answer types.

use faqbot_core::{AppError, AppResult};
use faqbot_llm::LlmUsage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Separator between per-chunk answers in the final response.
pub const ANSWER_SEPARATOR: &str = "\n\n";

/// Declared format of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Text,
    Pdf,
}

impl DocumentFormat {
    /// Parse a declared format tag (`text`, `txt`, `pdf`).
    pub fn from_tag(tag: &str) -> AppResult<Self> {
        match tag.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "pdf" => Ok(Self::Pdf),
            other => Err(AppError::UnsupportedFormat(format!(
                "format tag '{}' (expected text or pdf)",
                other
            ))),
        }
    }

    /// Detect the format from a filename extension (`.txt`, `.pdf`).
    pub fn from_filename(filename: &str) -> AppResult<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("txt") => Ok(Self::Text),
            Some("pdf") => Ok(Self::Pdf),
            Some(ext) => Err(AppError::UnsupportedFormat(format!(
                "'.{}' files are not supported (upload a .txt or .pdf file): {}",
                ext, filename
            ))),
            None => Err(AppError::UnsupportedFormat(format!(
                "file has no extension (upload a .txt or .pdf file): {}",
                filename
            ))),
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Pdf => "pdf",
        }
    }
}

/// Raw upload: bytes, filename and declared format. Lives for one request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub format: DocumentFormat,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    /// Create an upload, detecting the format from the filename.
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> AppResult<Self> {
        let filename = filename.into();
        let format = DocumentFormat::from_filename(&filename)?;
        Ok(Self {
            filename,
            format,
            bytes,
        })
    }

    /// Create an upload with an explicitly declared format.
    ///
    /// The filename must still carry a recognized extension.
    pub fn with_format(
        filename: impl Into<String>,
        format: DocumentFormat,
        bytes: Vec<u8>,
    ) -> AppResult<Self> {
        let filename = filename.into();
        DocumentFormat::from_filename(&filename)?;
        Ok(Self {
            filename,
            format,
            bytes,
        })
    }

    /// Read a local file as an upload.
    ///
    /// The extension is checked before the file is read.
    pub fn from_path(path: &Path, format: Option<DocumentFormat>) -> AppResult<Self> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                AppError::UnsupportedFormat(format!("not a file name: {:?}", path))
            })?
            .to_string();

        let detected = DocumentFormat::from_filename(&filename)?;

        let bytes = std::fs::read(path)?;
        tracing::debug!("Read {} bytes from {:?}", bytes.len(), path);

        Ok(Self {
            filename,
            format: format.unwrap_or(detected),
            bytes,
        })
    }
}

/// One unit of extracted text: a PDF page, or a whole text file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSegment {
    /// Position in source order (0-indexed)
    pub index: usize,

    /// Physical page number (1-indexed, PDF only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    pub text: String,
}

impl TextSegment {
    pub fn new(index: usize, page: Option<u32>, text: impl Into<String>) -> Self {
        Self {
            index,
            page,
            text: text.into(),
        }
    }

    /// Length in characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// A bounded span of document text sent to the model in one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk position (0-indexed)
    pub position: usize,

    pub text: String,

    /// Character offset of the first character in the joined document text
    pub start: usize,

    /// Character offset one past the last character
    pub end: usize,
}

impl Chunk {
    /// Length in characters.
    pub fn char_count(&self) -> usize {
        self.end - self.start
    }
}

/// The model's answer for one chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaResult {
    /// Position of the chunk this answers
    pub position: usize,

    pub answer: String,

    pub usage: LlmUsage,
}

/// Ordered concatenation of all per-chunk answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalResponse {
    pub answers: Vec<QaResult>,

    /// Answers joined with [`ANSWER_SEPARATOR`], in chunk order
    pub text: String,

    /// Summed token usage
    pub usage: LlmUsage,
}

impl FinalResponse {
    /// Join results in the order given; no sorting happens here.
    pub fn from_results(answers: Vec<QaResult>) -> Self {
        let text = answers
            .iter()
            .map(|r| r.answer.as_str())
            .collect::<Vec<_>>()
            .join(ANSWER_SEPARATOR);

        let usage = answers
            .iter()
            .fold(LlmUsage::default(), |acc, r| acc.add(&r.usage));

        Self {
            answers,
            text,
            usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(position: usize, answer: &str) -> QaResult {
        QaResult {
            position,
            answer: answer.to_string(),
            usage: LlmUsage::new(10, 2),
        }
    }

    #[test]
    fn test_format_from_filename() {
        assert_eq!(
            DocumentFormat::from_filename("notes.txt").unwrap(),
            DocumentFormat::Text
        );
        assert_eq!(
            DocumentFormat::from_filename("Report.PDF").unwrap(),
            DocumentFormat::Pdf
        );
        assert!(matches!(
            DocumentFormat::from_filename("slides.pptx"),
            Err(AppError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            DocumentFormat::from_filename("README"),
            Err(AppError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_format_from_tag() {
        assert_eq!(DocumentFormat::from_tag("text").unwrap(), DocumentFormat::Text);
        assert_eq!(DocumentFormat::from_tag(" PDF ").unwrap(), DocumentFormat::Pdf);
        assert!(matches!(
            DocumentFormat::from_tag("docx"),
            Err(AppError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_upload_rejects_unknown_extension() {
        let result = UploadedDocument::new("data.csv", b"a,b".to_vec());
        assert!(matches!(result, Err(AppError::UnsupportedFormat(_))));

        let result = UploadedDocument::with_format("data.csv", DocumentFormat::Text, vec![]);
        assert!(matches!(result, Err(AppError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_upload_from_path_checks_extension_first() {
        // Nonexistent file with a bad extension fails on format, not I/O
        let result = UploadedDocument::from_path(Path::new("/nonexistent/file.docx"), None);
        assert!(matches!(result, Err(AppError::UnsupportedFormat(_))));

        let result = UploadedDocument::from_path(Path::new("/nonexistent/file.txt"), None);
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[test]
    fn test_final_response_joins_in_order() {
        let response = FinalResponse::from_results(vec![
            result(0, "alpha"),
            result(1, "beta"),
            result(2, "gamma"),
        ]);
        assert_eq!(response.text, "alpha\n\nbeta\n\ngamma");
        assert_eq!(response.usage.total_tokens, 36);
    }

    #[test]
    fn test_final_response_follows_input_order() {
        let response = FinalResponse::from_results(vec![result(2, "gamma"), result(0, "alpha")]);
        assert_eq!(response.text, "gamma\n\nalpha");
    }

    #[test]
    fn test_final_response_keeps_duplicates() {
        let response = FinalResponse::from_results(vec![result(0, "same"), result(1, "same")]);
        assert_eq!(response.text, "same\n\nsame");
    }
}
