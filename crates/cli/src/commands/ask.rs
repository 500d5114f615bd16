//! Ask command handler.
//!
//! Answers a question against every chunk of a document and prints the
//! combined answer.

use super::{ChunkingArgs, DocumentArgs};
use clap::Args;
use faqbot_core::{config::AppConfig, AppError, AppResult};
use faqbot_docqa::{
    check_inputs, Chunk, FinalResponse, Ingestor, ProgressReporter, QaPipeline, QueryOptions,
};
use faqbot_llm::create_client;
use faqbot_prompt::{load_prompt, PromptRenderer, DEFAULT_QA_PROMPT_ID};
use std::time::Duration;

/// Ask a question about a document
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Option<String>,

    #[command(flatten)]
    pub document: DocumentArgs,

    #[command(flatten)]
    pub chunking: ChunkingArgs,

    /// Maximum tokens in each answer
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Temperature for response generation (0.0-2.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(
        &self,
        config: &AppConfig,
        ingestor: &Ingestor,
        progress: ProgressReporter,
    ) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let question = self.question.as_deref().unwrap_or_default();
        let policy = self.chunking.resolve(&config.chunking)?;

        let segments = self.document.ingest(ingestor).await?;
        let chunks = policy.apply(&segments);
        progress.chunk(chunks.len(), policy.name());

        // Before credentials are needed
        check_inputs(&chunks, question)?;

        config.validate()?;

        let client = create_client(
            &config.provider,
            config.endpoint.as_deref(),
            config.api_key.as_deref(),
            Some(Duration::from_secs(config.timeout_secs)),
        )
        .map_err(AppError::Config)?;

        let definition = load_prompt(&config.workspace, DEFAULT_QA_PROMPT_ID)?;
        let prompt_id = definition.id.clone();
        let renderer = PromptRenderer::new(definition)?;

        let mut options = QueryOptions::new(config.model.clone());
        options.max_tokens = self.max_tokens;
        options.temperature = self.temperature;

        let pipeline = QaPipeline::new(client, renderer, policy, options).with_progress(progress);
        let response = pipeline.answer_chunks(&chunks, question).await?;

        if self.json {
            self.print_json(config, &prompt_id, &chunks, &response)
        } else {
            println!("{}", response.text);

            tracing::debug!(
                "Token usage - Prompt: {}, Completion: {}, Total: {}",
                response.usage.prompt_tokens,
                response.usage.completion_tokens,
                response.usage.total_tokens
            );

            Ok(())
        }
    }

    fn print_json(
        &self,
        config: &AppConfig,
        prompt_id: &str,
        chunks: &[Chunk],
        response: &FinalResponse,
    ) -> AppResult<()> {
        let answers: Vec<_> = response
            .answers
            .iter()
            .zip(chunks)
            .map(|(result, chunk)| {
                serde_json::json!({
                    "position": result.position,
                    "start": chunk.start,
                    "end": chunk.end,
                    "answer": result.answer,
                })
            })
            .collect();

        let output = serde_json::json!({
            "answer": response.text,
            "answers": answers,
            "model": config.model,
            "provider": config.provider,
            "usage": {
                "promptTokens": response.usage.prompt_tokens,
                "completionTokens": response.usage.completion_tokens,
                "totalTokens": response.usage.total_tokens
            },
            "metadata": {
                "promptId": prompt_id,
                "file": self.document.file,
                "chunks": chunks.len()
            }
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}
