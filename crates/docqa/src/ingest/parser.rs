//! Text extraction from staged files.

use crate::types::{DocumentFormat, TextSegment};
use faqbot_core::{AppError, AppResult};
use lopdf::Document;
use std::fs;
use std::path::Path;

/// Turns a file on disk into ordered text segments.
///
/// A parser either returns every segment or fails; partial output is never
/// returned.
pub trait SegmentParser: Send + Sync {
    /// Format this parser reads.
    fn format(&self) -> DocumentFormat;

    fn parse(&self, path: &Path) -> AppResult<Vec<TextSegment>>;
}

/// Parser for the given format.
pub fn parser_for(format: DocumentFormat) -> Box<dyn SegmentParser> {
    match format {
        DocumentFormat::Text => Box::new(TextParser),
        DocumentFormat::Pdf => Box::new(PdfParser),
    }
}

/// Whole file as one UTF-8 segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextParser;

impl SegmentParser for TextParser {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Text
    }

    fn parse(&self, path: &Path) -> AppResult<Vec<TextSegment>> {
        let bytes = fs::read(path)
            .map_err(|e| AppError::ParseFailure(format!("Failed to read {:?}: {}", path, e)))?;

        let text = String::from_utf8(bytes).map_err(|e| {
            AppError::ParseFailure(format!(
                "text file is not valid UTF-8 (invalid byte at offset {})",
                e.utf8_error().valid_up_to()
            ))
        })?;

        Ok(vec![TextSegment::new(0, None, text)])
    }
}

/// One segment per PDF page, in page-number order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfParser;

impl SegmentParser for PdfParser {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn parse(&self, path: &Path) -> AppResult<Vec<TextSegment>> {
        let doc = Document::load(path)
            .map_err(|e| AppError::ParseFailure(format!("Failed to load PDF: {}", e)))?;

        // BTreeMap keyed by page number
        let pages = doc.get_pages();
        let mut segments = Vec::with_capacity(pages.len());

        for (index, page_num) in pages.keys().enumerate() {
            let text = doc.extract_text(&[*page_num]).map_err(|e| {
                AppError::ParseFailure(format!(
                    "Failed to extract text from page {}: {}",
                    page_num, e
                ))
            })?;
            segments.push(TextSegment::new(index, Some(*page_num), text));
        }

        tracing::debug!("Extracted {} pages from {:?}", segments.len(), path);

        Ok(segments)
    }
}
