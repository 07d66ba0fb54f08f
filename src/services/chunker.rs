//! Document chunking strategies
//!
//! Turns the raw fragments of one document into bounded-size chunks ready for
//! embedding. Every produced chunk carries the metadata of the first input
//! fragment, and chunk indices are contiguous from 0.

use tracing::{debug, info};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Chunk, ChunkingConfig, ChunkingStrategy, Fragment, Metadata};

/// Separator placed between aggregated fragments.
const JOIN: &str = " ";

/// A chunking strategy with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunker {
    /// Sliding window over whitespace-separated words.
    FixedSize {
        max_words: usize,
        overlap_words: usize,
    },
    /// Fragments aggregated up to a character budget, with a character
    /// overlap carried from the previous chunk.
    ///
    /// A chunk exceeds `max_chars` only when it starts with the overlap carry
    /// and the fragment appended after it is large: its length is then at most
    /// `overlap_chars + 1 + fragment length`. With fragments no longer than
    /// `max_chars` every chunk stays within `max_chars + overlap_chars + 1`.
    Paragraph {
        max_chars: usize,
        overlap_chars: usize,
    },
    /// Like `Paragraph` but title fragments always open a new chunk, and
    /// nothing is carried over between chunks.
    Title { max_chars: usize },
}

impl Chunker {
    /// Word-window chunker. `max_words` below 1 is raised to 1.
    pub fn fixed_size(max_words: usize, overlap_words: usize) -> Self {
        let chunker = Self::FixedSize {
            max_words: max_words.max(1),
            overlap_words,
        };
        debug!(
            max_words = max_words.max(1),
            overlap_words, "initialized fixed-size chunker"
        );
        chunker
    }

    pub fn paragraph(max_chars: usize, overlap_chars: usize) -> Self {
        debug!(max_chars, overlap_chars, "initialized paragraph chunker");
        Self::Paragraph {
            max_chars,
            overlap_chars,
        }
    }

    pub fn title(max_chars: usize) -> Self {
        debug!(max_chars, "initialized title chunker");
        Self::Title { max_chars }
    }

    /// Build the chunker selected by configuration.
    pub fn from_config(config: &ChunkingConfig) -> DomainResult<Self> {
        config
            .validate()
            .map_err(|e| DomainError::Validation(format!("Invalid chunking config: {e}")))?;

        Ok(match config.strategy {
            ChunkingStrategy::FixedSize => {
                Self::fixed_size(config.max_chunk_size, config.overlap_size)
            }
            ChunkingStrategy::Paragraph => {
                Self::paragraph(config.max_chunk_size, config.overlap_size)
            }
            ChunkingStrategy::Title => Self::title(config.max_chunk_size),
        })
    }

    pub const fn strategy(&self) -> ChunkingStrategy {
        match self {
            Self::FixedSize { .. } => ChunkingStrategy::FixedSize,
            Self::Paragraph { .. } => ChunkingStrategy::Paragraph,
            Self::Title { .. } => ChunkingStrategy::Title,
        }
    }

    /// Split `fragments` into chunks. Empty input yields no chunks.
    pub fn chunk(&self, fragments: &[Fragment]) -> Vec<Chunk> {
        let Some(first) = fragments.first() else {
            return Vec::new();
        };
        let metadata = &first.metadata;

        let texts = match *self {
            Self::FixedSize {
                max_words,
                overlap_words,
            } => word_windows(fragments, max_words, overlap_words),
            Self::Paragraph {
                max_chars,
                overlap_chars,
            } => aggregate(fragments, max_chars, overlap_chars, false),
            Self::Title { max_chars } => aggregate(fragments, max_chars, 0, true),
        };

        let chunks = into_chunks(texts, metadata);
        info!(
            strategy = %self.strategy(),
            "Chunked {} fragments into {} chunks",
            fragments.len(),
            chunks.len()
        );
        chunks
    }
}

fn into_chunks(texts: Vec<String>, metadata: &Metadata) -> Vec<Chunk> {
    texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk {
            text,
            index,
            metadata: metadata.clone(),
        })
        .collect()
}

fn word_windows(fragments: &[Fragment], max_words: usize, overlap_words: usize) -> Vec<String> {
    let joined = fragments
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join(JOIN);
    let words: Vec<&str> = joined.split_whitespace().collect();

    let mut windows = Vec::new();
    let mut start = 0;
    while start < words.len() {
        let end = (start + max_words).min(words.len());
        windows.push(words[start..end].join(" "));

        if end == words.len() {
            break;
        }

        // An overlap as large as the window would stall; advance by the full window instead.
        let next = end.saturating_sub(overlap_words);
        start = if next <= start { end } else { next };
    }

    debug!("Split {} words into {} chunks", words.len(), windows.len());
    windows
}

/// Shared accumulator for the paragraph and title strategies.
fn aggregate(
    fragments: &[Fragment],
    max_chars: usize,
    overlap_chars: usize,
    split_on_titles: bool,
) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for fragment in fragments {
        let text_len = fragment.text.chars().count();

        if split_on_titles && fragment.is_title() && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        let projected = if current.is_empty() {
            text_len
        } else {
            current_len + JOIN.len() + text_len
        };

        if projected > max_chars && !current.is_empty() {
            let flushed = std::mem::take(&mut current);
            current_len = 0;
            if overlap_chars > 0 {
                current = tail_chars(&flushed, overlap_chars);
                current_len = current.chars().count();
            }
            chunks.push(flushed);
        }

        if !current.is_empty() {
            current.push_str(JOIN);
            current_len += JOIN.len();
        }
        current.push_str(&fragment.text);
        current_len += text_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Last `n` characters of `text`, or all of it when shorter.
fn tail_chars(text: &str, n: usize) -> String {
    let total = text.chars().count();
    text.chars().skip(total.saturating_sub(n)).collect()
}
