//! Command handlers for the faqbot CLI.

pub mod ask;
pub mod inspect;

pub use ask::AskCommand;
pub use inspect::InspectCommand;

use clap::Args;
use faqbot_core::{AppError, AppResult, ChunkPolicyKind, ChunkingConfig};
use faqbot_docqa::{ChunkPolicy, DocumentFormat, Ingestor, TextSegment, UploadedDocument};
use std::path::PathBuf;

/// Document selection shared by every command.
#[derive(Args, Debug, Default)]
pub struct DocumentArgs {
    /// Document to read (.txt or .pdf)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Declared format, overriding the extension (text, pdf)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,
}

impl DocumentArgs {
    /// Read, stage and parse the document on a blocking thread.
    pub async fn ingest(&self, ingestor: &Ingestor) -> AppResult<Vec<TextSegment>> {
        let path = self.file.clone().ok_or(AppError::MissingInput)?;
        let format = self
            .format
            .as_deref()
            .map(DocumentFormat::from_tag)
            .transpose()?;

        let ingestor = ingestor.clone();
        tokio::task::spawn_blocking(move || {
            let document = UploadedDocument::from_path(&path, format)?;
            ingestor.ingest(&document)
        })
        .await
        .map_err(|e| AppError::ParseFailure(format!("Ingestion task failed: {}", e)))?
    }
}

/// Chunking overrides on top of the configured settings.
#[derive(Args, Debug, Default)]
pub struct ChunkingArgs {
    /// Chunking policy (sliding, truncate)
    #[arg(long)]
    pub policy: Option<String>,

    /// Sliding window size in characters
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Characters shared by consecutive windows
    #[arg(long)]
    pub overlap: Option<usize>,

    /// Character budget for the truncate policy
    #[arg(long)]
    pub budget: Option<usize>,
}

impl ChunkingArgs {
    /// Resolve the policy, flags taking precedence over configuration.
    pub fn resolve(&self, base: &ChunkingConfig) -> AppResult<ChunkPolicy> {
        let mut config = base.clone();

        if let Some(ref policy) = self.policy {
            config.policy = ChunkPolicyKind::parse(policy)?;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        if let Some(overlap) = self.overlap {
            config.overlap = overlap;
        }
        if let Some(budget) = self.budget {
            config.budget = budget;
        }

        ChunkPolicy::from_config(&config)
    }
}
