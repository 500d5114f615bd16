//! Document question answering.
//!
//! Turns an uploaded text or PDF document into ordered text segments,
//! cuts them into chunks that fit the model's input budget, and asks the
//! same question once per chunk.
//!
//! # Example
//! ```no_run
//! use faqbot_docqa::{ChunkPolicy, Ingestor, QaPipeline, QueryOptions, StagingArea, UploadedDocument};
//! use faqbot_llm::MockClient;
//! use faqbot_prompt::{PromptDefinition, PromptRenderer};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ingestor = Ingestor::new(StagingArea::create(".faqbot/staging")?);
//! let document = UploadedDocument::from_path(Path::new("faq.txt"), None)?;
//! let segments = ingestor.ingest(&document)?;
//!
//! let pipeline = QaPipeline::new(
//!     Arc::new(MockClient::new()),
//!     PromptRenderer::new(PromptDefinition::default_qa())?,
//!     ChunkPolicy::default(),
//!     QueryOptions::new("llama3-8b-8192"),
//! );
//! let response = pipeline.answer(&segments, "How do refunds work?").await?;
//! println!("{}", response.text);
//! # Ok(())
//! # }
//! ```

pub mod chunker;
pub mod ingest;
pub mod pipeline;
pub mod progress;
pub mod types;

// Re-export commonly used types
pub use chunker::{join_segments, ChunkPolicy, SEGMENT_SEPARATOR};
pub use ingest::{Ingestor, StagedFile, StagingArea};
pub use pipeline::{check_inputs, QaPipeline, QueryOptions, QueryPlan};
pub use progress::{Phase, ProgressCallback, ProgressEvent, ProgressReporter};
pub use types::{
    Chunk, DocumentFormat, FinalResponse, QaResult, TextSegment, UploadedDocument,
    ANSWER_SEPARATOR,
};
