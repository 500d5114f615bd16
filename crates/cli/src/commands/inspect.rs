//! Inspect command handler.
//!
//! Shows how a document would be segmented and chunked, without calling
//! the model.

use super::{ChunkingArgs, DocumentArgs};
use clap::Args;
use faqbot_core::{config::AppConfig, AppResult};
use faqbot_docqa::{join_segments, Ingestor};

/// Show segment and chunk statistics for a document
#[derive(Args, Debug)]
pub struct InspectCommand {
    #[command(flatten)]
    pub document: DocumentArgs,

    #[command(flatten)]
    pub chunking: ChunkingArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl InspectCommand {
    pub async fn execute(&self, config: &AppConfig, ingestor: &Ingestor) -> AppResult<()> {
        tracing::info!("Executing inspect command");
        tracing::debug!("Inspect options: {:?}", self);

        let policy = self.chunking.resolve(&config.chunking)?;
        let segments = self.document.ingest(ingestor).await?;
        let chunks = policy.apply(&segments);
        let total_chars = join_segments(&segments).chars().count();

        if self.json {
            let output = serde_json::json!({
                "file": self.document.file,
                "policy": format!("{:?}", policy),
                "totalChars": total_chars,
                "segments": segments.iter().map(|s| serde_json::json!({
                    "index": s.index,
                    "page": s.page,
                    "chars": s.char_count(),
                })).collect::<Vec<_>>(),
                "chunks": chunks.iter().map(|c| serde_json::json!({
                    "position": c.position,
                    "start": c.start,
                    "end": c.end,
                    "chars": c.char_count(),
                })).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("Segments: {}", segments.len());
        for segment in &segments {
            match segment.page {
                Some(page) => println!("  page {:>4}  {:>8} chars", page, segment.char_count()),
                None => println!("  #{:<8} {:>8} chars", segment.index, segment.char_count()),
            }
        }

        println!("Total: {} chars", total_chars);
        println!("Chunks: {} ({:?})", chunks.len(), policy);
        for chunk in &chunks {
            println!(
                "  [{}] {}..{}  {} chars",
                chunk.position,
                chunk.start,
                chunk.end,
                chunk.char_count()
            );
        }

        if chunks.is_empty() {
            tracing::warn!("Document has no text to query");
        }

        Ok(())
    }
}
