//! Text chunking policies with character budgets.
//!
//! Lengths and offsets are counted in `char`s, so a chunk boundary never
//! falls inside a multi-byte character.

use crate::types::{Chunk, TextSegment};
use faqbot_core::{AppError, AppResult, ChunkPolicyKind, ChunkingConfig};

/// Inserted between consecutive segments; counts toward chunk lengths.
pub const SEGMENT_SEPARATOR: &str = "\n";

/// How joined document text is cut into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkPolicy {
    /// Keep at most `budget` characters from the start of the document.
    Truncate { budget: usize },

    /// Windows of at most `size` characters, each sharing `overlap`
    /// characters with the previous one.
    SlidingWindow { size: usize, overlap: usize },
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self::SlidingWindow {
            size: 5000,
            overlap: 400,
        }
    }
}

impl ChunkPolicy {
    /// Validated truncate policy.
    pub fn truncate(budget: usize) -> AppResult<Self> {
        let policy = Self::Truncate { budget };
        policy.validate()?;
        Ok(policy)
    }

    /// Validated sliding-window policy.
    pub fn sliding_window(size: usize, overlap: usize) -> AppResult<Self> {
        let policy = Self::SlidingWindow { size, overlap };
        policy.validate()?;
        Ok(policy)
    }

    /// Build the policy selected in configuration.
    pub fn from_config(config: &ChunkingConfig) -> AppResult<Self> {
        match config.policy {
            ChunkPolicyKind::Truncate => Self::truncate(config.budget),
            ChunkPolicyKind::Sliding => Self::sliding_window(config.chunk_size, config.overlap),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        match *self {
            Self::Truncate { budget } if budget == 0 => Err(AppError::Config(
                "truncate budget must be greater than 0".to_string(),
            )),
            Self::SlidingWindow { size, .. } if size == 0 => Err(AppError::Config(
                "chunk size must be greater than 0".to_string(),
            )),
            Self::SlidingWindow { size, overlap } if overlap >= size => {
                Err(AppError::Config(format!(
                    "overlap ({}) must be smaller than chunk size ({})",
                    overlap, size
                )))
            }
            _ => Ok(()),
        }
    }

    /// Policy name as used in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Truncate { .. } => ChunkPolicyKind::Truncate.as_str(),
            Self::SlidingWindow { .. } => ChunkPolicyKind::Sliding.as_str(),
        }
    }

    /// Cut the ordered segments into chunks.
    ///
    /// Returns no chunks when the joined text is empty or whitespace only.
    pub fn apply(&self, segments: &[TextSegment]) -> Vec<Chunk> {
        let chunks = match *self {
            Self::Truncate { budget } => truncate(segments, budget),
            Self::SlidingWindow { size, overlap } => {
                sliding_window(&join_segments(segments), size, overlap)
            }
        };

        tracing::debug!(
            "Chunked {} segments into {} chunks ({:?})",
            segments.len(),
            chunks.len(),
            self
        );

        chunks
    }
}

/// Concatenate segment texts in order with [`SEGMENT_SEPARATOR`].
pub fn join_segments(segments: &[TextSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(SEGMENT_SEPARATOR)
}

/// Accumulate segments into one buffer until the budget runs out.
///
/// Blank segments (empty PDF pages) are skipped so they cannot spend the
/// budget on separators.
fn truncate(segments: &[TextSegment], budget: usize) -> Vec<Chunk> {
    let mut buffer = String::new();
    let mut used = 0usize;

    let filled = segments.iter().filter(|s| !s.text.trim().is_empty());
    for (i, segment) in filled.enumerate() {
        if i > 0 {
            if used == budget {
                break;
            }
            buffer.push_str(SEGMENT_SEPARATOR);
            used += SEGMENT_SEPARATOR.chars().count();
        }

        let remaining = budget - used;
        match segment.text.char_indices().nth(remaining) {
            Some((cut, _)) => {
                buffer.push_str(&segment.text[..cut]);
                used = budget;
                tracing::debug!(
                    "Budget of {} chars exhausted in segment {}",
                    budget,
                    segment.index
                );
                break;
            }
            None => {
                buffer.push_str(&segment.text);
                used += segment.char_count();
            }
        }
    }

    if buffer.trim().is_empty() {
        return vec![];
    }

    vec![Chunk {
        position: 0,
        text: buffer,
        start: 0,
        end: used,
    }]
}

/// Split text into overlapping windows.
fn sliding_window(text: &str, size: usize, overlap: usize) -> Vec<Chunk> {
    if text.trim().is_empty() {
        return vec![];
    }

    // Byte offset of every char, plus the end of the text
    let offsets: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let total = offsets.len() - 1;
    let step = size - overlap;

    let mut chunks = Vec::new();
    let mut start = 0usize;

    loop {
        let end = (start + size).min(total);
        chunks.push(Chunk {
            position: chunks.len(),
            text: text[offsets[start]..offsets[end]].to_string(),
            start,
            end,
        });

        if end == total {
            break;
        }
        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(texts: &[&str]) -> Vec<TextSegment> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| TextSegment::new(i, None, *t))
            .collect()
    }

    fn expected_count(len: usize, size: usize, overlap: usize) -> usize {
        if len == 0 {
            return 0;
        }
        if len <= overlap {
            return 1;
        }
        (len - overlap).div_ceil(size - overlap).max(1)
    }

    #[test]
    fn test_sliding_window_twelve_thousand_chars() {
        let policy = ChunkPolicy::sliding_window(5000, 400).unwrap();
        let chunks = policy.apply(&segments(&[&"x".repeat(12000)]));

        let lengths: Vec<usize> = chunks.iter().map(|c| c.text.chars().count()).collect();
        assert_eq!(lengths, vec![5000, 5000, 2800]);
        assert_eq!(chunks[1].start, 4600);
        assert_eq!(chunks[2].start, 9200);
        assert_eq!(chunks[2].end, 12000);
    }

    #[test]
    fn test_sliding_window_count_formula() {
        for (len, size, overlap) in [
            (1, 10, 3),
            (10, 10, 3),
            (11, 10, 3),
            (17, 10, 3),
            (18, 10, 3),
            (100, 7, 0),
            (2, 10, 5),
            (999, 50, 49),
        ] {
            let text = "a".repeat(len);
            let chunks = sliding_window(&text, size, overlap);
            assert_eq!(
                chunks.len(),
                expected_count(len, size, overlap),
                "len={} size={} overlap={}",
                len,
                size,
                overlap
            );
            assert!(chunks.iter().all(|c| c.char_count() <= size));
        }
    }

    #[test]
    fn test_sliding_window_overlap_is_shared() {
        let text: String = ('a'..='z').cycle().take(130).collect();
        let chunks = sliding_window(&text, 40, 8);

        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].text.chars().collect();
            let next: Vec<char> = pair[1].text.chars().collect();
            assert_eq!(&prev[prev.len() - 8..], &next[..8]);
        }
    }

    #[test]
    fn test_sliding_window_multibyte() {
        let text = "héllo wörld ünïcode ✓✓✓".repeat(20);
        let chunks = sliding_window(&text, 13, 4);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 13);
        }
        let last = chunks.last().unwrap();
        assert_eq!(last.end, text.chars().count());
    }

    #[test]
    fn test_sliding_window_empty_text() {
        let policy = ChunkPolicy::default();
        assert!(policy.apply(&[]).is_empty());
        assert!(policy.apply(&segments(&[""])).is_empty());
        assert!(policy.apply(&segments(&["  \n\t "])).is_empty());
    }

    #[test]
    fn test_segments_joined_with_separator() {
        let policy = ChunkPolicy::sliding_window(100, 10).unwrap();
        let chunks = policy.apply(&segments(&["page one", "page two"]));

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "page one\npage two");
        assert_eq!(chunks[0].end, 17);
    }

    #[test]
    fn test_truncate_exact_budget() {
        let policy = ChunkPolicy::truncate(5000).unwrap();
        let chunks = policy.apply(&segments(&[&"a".repeat(3000), &"b".repeat(3000)]));

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text.chars().count(), 5000);
        assert_eq!(chunks[0].end, 5000);
        // 3000 + separator + 1999
        assert!(chunks[0].text.ends_with(&format!("\n{}", "b".repeat(1999))));
    }

    #[test]
    fn test_truncate_under_budget_keeps_everything() {
        let policy = ChunkPolicy::truncate(50).unwrap();
        let chunks = policy.apply(&segments(&["first", "second"]));

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "first\nsecond");
    }

    #[test]
    fn test_truncate_stops_consuming_segments() {
        let policy = ChunkPolicy::truncate(5).unwrap();
        let chunks = policy.apply(&segments(&["abcde", "fgh", "ijk"]));

        assert_eq!(chunks[0].text, "abcde");
    }

    #[test]
    fn test_truncate_multibyte() {
        let policy = ChunkPolicy::truncate(3).unwrap();
        let chunks = policy.apply(&segments(&["日本語テキスト"]));
        assert_eq!(chunks[0].text, "日本語");
    }

    #[test]
    fn test_truncate_skips_blank_segments() {
        let policy = ChunkPolicy::truncate(5).unwrap();
        let mut texts = vec![""; 9];
        texts.push("abc");
        let chunks = policy.apply(&segments(&texts));

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "abc");
        assert_eq!(chunks[0].end, 3);

        let chunks = policy.apply(&segments(&["ab", " ", "", "cd"]));
        assert_eq!(chunks[0].text, "ab\ncd");
    }

    #[test]
    fn test_truncate_empty() {
        let policy = ChunkPolicy::truncate(10).unwrap();
        assert!(policy.apply(&segments(&["", ""])).is_empty());
    }

    #[test]
    fn test_policy_validation() {
        assert!(ChunkPolicy::truncate(0).is_err());
        assert!(ChunkPolicy::sliding_window(0, 0).is_err());
        assert!(ChunkPolicy::sliding_window(100, 100).is_err());
        assert!(ChunkPolicy::sliding_window(100, 99).is_ok());
    }

    #[test]
    fn test_from_config() {
        let mut config = ChunkingConfig::default();
        assert_eq!(
            ChunkPolicy::from_config(&config).unwrap(),
            ChunkPolicy::default()
        );

        config.policy = ChunkPolicyKind::Truncate;
        config.budget = 1200;
        let policy = ChunkPolicy::from_config(&config).unwrap();
        assert_eq!(policy, ChunkPolicy::Truncate { budget: 1200 });
        assert_eq!(policy.name(), "truncate");
    }
}
