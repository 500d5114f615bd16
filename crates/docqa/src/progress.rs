//! Progress lines for a question-answering run.
//!
//! Each model call can take seconds, so the reporter tells the caller when a
//! run moves from one step to the next and how many calls are done.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Step of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Stage,
    Parse,
    Chunk,
    Query,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Stage => "stage",
            Phase::Parse => "parse",
            Phase::Chunk => "chunk",
            Phase::Query => "query",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub phase: Phase,

    /// Items handled so far
    pub done: usize,

    /// Known item count, if the phase has one
    pub of: Option<usize>,

    pub detail: String,

    /// Time since the reporter was created
    pub elapsed: Duration,
}

impl ProgressEvent {
    fn new(phase: Phase, done: usize, of: Option<usize>, detail: String) -> Self {
        Self {
            phase,
            done,
            of,
            detail,
            elapsed: Duration::ZERO,
        }
    }
}

/// `[query] 1/4 (25%) - model=...`; the percentage only appears with a known total.
impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.phase, self.done)?;
        if let Some(of) = self.of {
            let pct = if of == 0 { 0 } else { self.done * 100 / of };
            write!(f, "/{} ({}%)", of, pct)?;
        }
        write!(f, " - {}", self.detail)
    }
}

pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Cheap to clone; clones share the callback and start time.
#[derive(Clone)]
pub struct ProgressReporter {
    sink: Option<ProgressCallback>,
    started: Instant,
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("enabled", &self.sink.is_some())
            .finish()
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::noop()
    }
}

impl ProgressReporter {
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            sink: Some(callback),
            started: Instant::now(),
        }
    }

    pub fn noop() -> Self {
        Self {
            sink: None,
            started: Instant::now(),
        }
    }

    fn send(&self, phase: Phase, done: usize, of: Option<usize>, detail: String) {
        let Some(sink) = &self.sink else {
            return;
        };

        let mut event = ProgressEvent::new(phase, done, of, detail);
        event.elapsed = self.started.elapsed();
        tracing::debug!(
            phase = event.phase.as_str(),
            done = event.done,
            of = ?event.of,
            elapsed_ms = event.elapsed.as_millis() as u64,
            "{}",
            event.detail
        );
        sink(event);
    }

    pub fn stage(&self, filename: &str, bytes: usize) {
        self.send(
            Phase::Stage,
            1,
            Some(1),
            format!("staged {} ({} bytes)", filename, bytes),
        );
    }

    pub fn parse(&self, segments: usize, format: &str) {
        self.send(
            Phase::Parse,
            segments,
            None,
            format!("{} segments extracted ({})", segments, format),
        );
    }

    pub fn chunk(&self, chunks: usize, policy: &str) {
        self.send(
            Phase::Chunk,
            chunks,
            None,
            format!("{} chunks created (policy={})", chunks, policy),
        );
    }

    /// Called after each model call returns.
    pub fn query(&self, completed: usize, total: usize, model: &str) {
        self.send(Phase::Query, completed, Some(total), format!("model={}", model));
    }
}
