//! Chunk-and-query orchestration.
//!
//! Chunks the document text, asks the model the same question once per
//! chunk, and joins the answers in chunk order.

use crate::chunker::ChunkPolicy;
use crate::progress::ProgressReporter;
use crate::types::{Chunk, FinalResponse, QaResult, TextSegment};
use faqbot_core::{AppError, AppResult};
use faqbot_llm::{LlmClient, LlmRequest};
use faqbot_prompt::PromptRenderer;
use std::collections::VecDeque;
use std::sync::Arc;

/// Per-call model parameters.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl QueryOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: None,
            temperature: None,
        }
    }
}

/// One model call waiting to run.
#[derive(Debug, Clone)]
pub struct PendingCall {
    pub position: usize,
    pub request: LlmRequest,
}

/// Ordered queue of model calls, one per chunk.
#[derive(Debug, Default)]
pub struct QueryPlan {
    calls: VecDeque<PendingCall>,
    total: usize,
}

impl QueryPlan {
    /// Render every chunk's prompt up front.
    pub fn build(
        chunks: &[Chunk],
        question: &str,
        renderer: &PromptRenderer,
        options: &QueryOptions,
    ) -> AppResult<Self> {
        let mut calls = VecDeque::with_capacity(chunks.len());

        for chunk in chunks {
            let built = renderer.render(&chunk.text, question)?;

            let mut request = LlmRequest::new(built.user, options.model.clone());
            if let Some(system) = built.system {
                request = request.with_system(system);
            }
            if let Some(max_tokens) = options.max_tokens {
                request = request.with_max_tokens(max_tokens);
            }
            if let Some(temperature) = options.temperature {
                request = request.with_temperature(temperature);
            }

            calls.push_back(PendingCall {
                position: chunk.position,
                request,
            });
        }

        Ok(Self {
            total: calls.len(),
            calls,
        })
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Run the calls one at a time.
    ///
    /// The first failure aborts the plan; answers gathered so far are
    /// dropped.
    pub async fn run(
        mut self,
        client: &dyn LlmClient,
        progress: &ProgressReporter,
    ) -> AppResult<Vec<QaResult>> {
        let mut results = Vec::with_capacity(self.total);

        while let Some(call) = self.calls.pop_front() {
            tracing::debug!(
                "Querying chunk {}/{} ({} prompt chars)",
                call.position + 1,
                self.total,
                call.request.prompt.len()
            );

            let response = client.complete(&call.request).await.map_err(|e| {
                tracing::error!(
                    "Model call failed on chunk {}/{}, {} calls skipped",
                    call.position + 1,
                    self.total,
                    self.calls.len()
                );
                match e {
                    AppError::ModelCall(msg) => AppError::ModelCall(format!(
                        "chunk {}/{}: {}",
                        call.position + 1,
                        self.total,
                        msg
                    )),
                    other => other,
                }
            })?;

            results.push(QaResult {
                position: call.position,
                answer: response.content,
                usage: response.usage,
            });
            progress.query(results.len(), self.total, &call.request.model);
        }

        Ok(results)
    }
}

/// Reject a run that has no document text or no question.
///
/// Missing text is reported before a missing question.
pub fn check_inputs(chunks: &[Chunk], question: &str) -> AppResult<()> {
    if chunks.is_empty() {
        return Err(AppError::MissingInput);
    }
    if question.trim().is_empty() {
        return Err(AppError::MissingQuestion);
    }
    Ok(())
}

/// Question answering over one document.
pub struct QaPipeline {
    client: Arc<dyn LlmClient>,
    renderer: PromptRenderer,
    policy: ChunkPolicy,
    options: QueryOptions,
    progress: ProgressReporter,
}

impl QaPipeline {
    pub fn new(
        client: Arc<dyn LlmClient>,
        renderer: PromptRenderer,
        policy: ChunkPolicy,
        options: QueryOptions,
    ) -> Self {
        Self {
            client,
            renderer,
            policy,
            options,
            progress: ProgressReporter::noop(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn policy(&self) -> ChunkPolicy {
        self.policy
    }

    /// Apply the chunking policy.
    pub fn chunk(&self, segments: &[TextSegment]) -> Vec<Chunk> {
        let chunks = self.policy.apply(segments);
        self.progress.chunk(chunks.len(), self.policy.name());
        chunks
    }

    /// Chunk the segments and answer the question against every chunk.
    pub async fn answer(
        &self,
        segments: &[TextSegment],
        question: &str,
    ) -> AppResult<FinalResponse> {
        let chunks = self.chunk(segments);
        self.answer_chunks(&chunks, question).await
    }

    /// Answer the question against already-built chunks, in the given order.
    pub async fn answer_chunks(
        &self,
        chunks: &[Chunk],
        question: &str,
    ) -> AppResult<FinalResponse> {
        check_inputs(chunks, question)?;

        let plan = QueryPlan::build(chunks, question, &self.renderer, &self.options)?;

        tracing::info!(
            "Answering over {} chunks with {} ({}, prompt {})",
            plan.len(),
            self.options.model,
            self.client.provider_name(),
            self.renderer.prompt_id()
        );

        let results = plan.run(self.client.as_ref(), &self.progress).await?;
        let response = FinalResponse::from_results(results);

        tracing::info!(
            "Collected {} answers ({} total tokens)",
            response.answers.len(),
            response.usage.total_tokens
        );

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faqbot_llm::MockClient;
    use faqbot_prompt::PromptDefinition;

    fn pipeline(client: Arc<MockClient>, policy: ChunkPolicy) -> QaPipeline {
        QaPipeline::new(
            client,
            PromptRenderer::new(PromptDefinition::default_qa()).unwrap(),
            policy,
            QueryOptions::new("mock-model"),
        )
    }

    fn text_segment(text: &str) -> Vec<TextSegment> {
        vec![TextSegment::new(0, None, text)]
    }

    #[tokio::test]
    async fn test_twelve_thousand_chars_three_calls() {
        let client = Arc::new(MockClient::with_answers(["one", "two", "three"]));
        let pipeline = pipeline(client.clone(), ChunkPolicy::default());

        let response = pipeline
            .answer(&text_segment(&"z".repeat(12000)), "What is z?")
            .await
            .unwrap();

        assert_eq!(client.call_count(), 3);
        assert_eq!(response.text, "one\n\ntwo\n\nthree");
        assert_eq!(
            response.answers.iter().map(|a| a.position).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );

        let prompts = client.prompts();
        assert!(prompts[0].contains(&"z".repeat(5000)));
        assert!(!prompts[0].contains(&"z".repeat(5001)));
        assert!(prompts[2].contains(&"z".repeat(2800)));
        assert!(!prompts[2].contains(&"z".repeat(2801)));
    }

    #[tokio::test]
    async fn test_prompt_carries_chunk_and_question() {
        let client = Arc::new(MockClient::new());
        let pipeline = pipeline(client.clone(), ChunkPolicy::default());

        pipeline
            .answer(&text_segment("Refunds take 5 days."), "How long do refunds take?")
            .await
            .unwrap();

        assert_eq!(
            client.prompts(),
            vec![
                "Here is the text: Refunds take 5 days.. Answer the following question \
                 based on the given text: How long do refunds take?."
                    .to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_no_document_is_missing_input() {
        let client = Arc::new(MockClient::new());
        let pipeline = pipeline(client.clone(), ChunkPolicy::default());

        let err = pipeline.answer(&[], "Anything?").await.unwrap_err();
        assert!(matches!(err, AppError::MissingInput));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_input_checked_before_question() {
        let client = Arc::new(MockClient::new());
        let pipeline = pipeline(client.clone(), ChunkPolicy::default());

        let err = pipeline.answer(&text_segment("   "), "").await.unwrap_err();
        assert!(matches!(err, AppError::MissingInput));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_question_is_missing_question() {
        let client = Arc::new(MockClient::new());
        let pipeline = pipeline(client.clone(), ChunkPolicy::default());

        for question in ["", "   ", "\n\t"] {
            let err = pipeline
                .answer(&text_segment("Some content"), question)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::MissingQuestion));
        }
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_calls() {
        let client = Arc::new(MockClient::new().failing_on(1));
        let policy = ChunkPolicy::sliding_window(10, 0).unwrap();
        let pipeline = pipeline(client.clone(), policy);

        let err = pipeline
            .answer(&text_segment(&"a".repeat(40)), "q?")
            .await
            .unwrap_err();

        // Second of four chunks failed; the last two were never sent
        assert_eq!(client.call_count(), 2);
        match err {
            AppError::ModelCall(msg) => assert!(msg.starts_with("chunk 2/4:")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_answers_follow_chunk_order() {
        let client = Arc::new(MockClient::new());
        let pipeline = pipeline(client.clone(), ChunkPolicy::sliding_window(5, 0).unwrap());

        let forward = pipeline
            .answer(&text_segment("AAAAABBBBB"), "q")
            .await
            .unwrap();

        let mut chunks = pipeline.chunk(&text_segment("AAAAABBBBB"));
        chunks.reverse();
        let reversed = pipeline.answer_chunks(&chunks, "q").await.unwrap();

        let forward_answers: Vec<_> = forward.answers.iter().map(|a| a.answer.clone()).collect();
        let mut reversed_answers: Vec<_> =
            reversed.answers.iter().map(|a| a.answer.clone()).collect();
        reversed_answers.reverse();
        assert_eq!(forward_answers, reversed_answers);
        assert_eq!(reversed.answers[0].position, 1);
    }

    #[tokio::test]
    async fn test_truncate_single_call() {
        let client = Arc::new(MockClient::with_answers(["only"]));
        let pipeline = pipeline(client.clone(), ChunkPolicy::truncate(5000).unwrap());

        let segments = vec![
            TextSegment::new(0, Some(1), "p".repeat(4000)),
            TextSegment::new(1, Some(2), "q".repeat(4000)),
        ];
        let response = pipeline.answer(&segments, "q?").await.unwrap();

        assert_eq!(client.call_count(), 1);
        assert_eq!(response.text, "only");
        assert!(client.prompts()[0].contains(&format!("{}\n{}", "p".repeat(4000), "q".repeat(999))));
    }

    #[tokio::test]
    async fn test_request_options_applied() {
        let client = Arc::new(MockClient::new());
        let renderer = PromptRenderer::new(PromptDefinition::default_qa()).unwrap();
        let mut options = QueryOptions::new("llama3-8b-8192");
        options.max_tokens = Some(256);
        options.temperature = Some(0.2);

        let chunks = ChunkPolicy::default().apply(&text_segment("text"));
        let plan = QueryPlan::build(&chunks, "q", &renderer, &options).unwrap();
        assert_eq!(plan.len(), 1);

        let request = &plan.calls[0].request;
        assert_eq!(request.model, "llama3-8b-8192");
        assert_eq!(request.max_tokens, Some(256));
        assert_eq!(request.temperature, Some(0.2));

        let results = plan.run(client.as_ref(), &ProgressReporter::noop()).await.unwrap();
        assert_eq!(results.len(), 1);
    }
}
