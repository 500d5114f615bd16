//! Document ingestion: staging and text extraction.

pub mod parser;
pub mod staging;

pub use parser::{parser_for, PdfParser, SegmentParser, TextParser};
pub use staging::{StagedFile, StagingArea};

use crate::progress::ProgressReporter;
use crate::types::{TextSegment, UploadedDocument};
use faqbot_core::AppResult;

/// Stages uploads and extracts their text segments.
#[derive(Debug, Clone)]
pub struct Ingestor {
    staging: StagingArea,
    progress: ProgressReporter,
}

impl Ingestor {
    pub fn new(staging: StagingArea) -> Self {
        Self {
            staging,
            progress: ProgressReporter::noop(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Stage the upload, parse it, and remove the staged file.
    ///
    /// Blocking; async callers should run this on a blocking thread.
    pub fn ingest(&self, document: &UploadedDocument) -> AppResult<Vec<TextSegment>> {
        tracing::info!(
            "Ingesting {} ({}, {} bytes)",
            document.filename,
            document.format.as_str(),
            document.bytes.len()
        );

        let staged = self.staging.stage(document)?;
        self.progress.stage(&document.filename, document.bytes.len());

        let segments = parser_for(document.format).parse(staged.path())?;
        drop(staged);

        self.progress.parse(segments.len(), document.format.as_str());
        tracing::debug!("Extracted {} segments", segments.len());

        Ok(segments)
    }
}
