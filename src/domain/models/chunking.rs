//! Text chunking domain models
//!
//! Fragments come out of a document loader, chunks come out of a chunker,
//! and a document ties the produced chunks to their source.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Free-form metadata attached to fragments, chunks and search results.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Metadata key a loader uses to mark the structural role of a fragment.
pub const ELEMENT_TYPE_KEY: &str = "element_type";

/// `element_type` value marking a title/heading fragment.
pub const TITLE_ELEMENT: &str = "Title";

/// A raw unit of text produced by a document loader, prior to chunking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Fragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Mark this fragment as a title element.
    pub fn as_title(mut self) -> Self {
        self.metadata.insert(
            ELEMENT_TYPE_KEY.to_string(),
            serde_json::Value::String(TITLE_ELEMENT.to_string()),
        );
        self
    }

    pub fn is_title(&self) -> bool {
        self.metadata
            .get(ELEMENT_TYPE_KEY)
            .and_then(serde_json::Value::as_str)
            == Some(TITLE_ELEMENT)
    }
}

/// A bounded-size unit of document text prepared for embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    /// 0-based position within the produced sequence
    pub index: usize,
    pub metadata: Metadata,
}

/// Result of ingesting one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub path: String,
    pub chunks: Vec<Chunk>,
    pub metadata: Metadata,
}

impl Document {
    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }
}

/// Chunking strategy selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChunkingStrategy {
    #[serde(rename = "fixed_size")]
    FixedSize,
    #[serde(rename = "by_paragraph", alias = "paragraph")]
    Paragraph,
    #[serde(rename = "by_title", alias = "title")]
    Title,
}

impl ChunkingStrategy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FixedSize => "fixed_size",
            Self::Paragraph => "by_paragraph",
            Self::Title => "by_title",
        }
    }
}

impl fmt::Display for ChunkingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChunkingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed_size" => Ok(Self::FixedSize),
            "by_paragraph" | "paragraph" => Ok(Self::Paragraph),
            "by_title" | "title" => Ok(Self::Title),
            other => Err(format!(
                "Unknown chunking strategy: {other}. Must be one of: fixed_size, by_paragraph, by_title"
            )),
        }
    }
}

/// Configuration for document chunking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChunkingConfig {
    #[serde(default = "default_strategy")]
    pub strategy: ChunkingStrategy,

    /// Accepted for compatibility with existing config files; not used by
    /// any strategy.
    #[serde(default = "default_min_chunk_size")]
    pub min_chunk_size: usize,

    /// Words for `fixed_size`, characters for the aggregating strategies
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// Words for `fixed_size`, characters for `by_paragraph`
    #[serde(default = "default_overlap_size")]
    pub overlap_size: usize,
}

const fn default_strategy() -> ChunkingStrategy {
    ChunkingStrategy::FixedSize
}

const fn default_min_chunk_size() -> usize {
    100
}

const fn default_max_chunk_size() -> usize {
    500
}

const fn default_overlap_size() -> usize {
    50
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            min_chunk_size: default_min_chunk_size(),
            max_chunk_size: default_max_chunk_size(),
            overlap_size: default_overlap_size(),
        }
    }
}

impl ChunkingConfig {
    /// Validate the chunking configuration
    ///
    /// An overlap at or above the window size is allowed: the fixed-size
    /// strategy then advances by the whole window.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_chunk_size == 0 {
            return Err("max_chunk_size must be greater than 0".to_string());
        }
        Ok(())
    }
}
