//! Vector search models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::chunking::Metadata;

/// A single hit returned by a vector store search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub text: String,
    /// Higher is more similar
    pub score: f32,
    pub metadata: Metadata,
}

/// Distance metric of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distance {
    Cosine,
    Euclidean,
    Dot,
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cosine => write!(f, "cosine"),
            Self::Euclidean => write!(f, "euclidean"),
            Self::Dot => write!(f, "dot"),
        }
    }
}

impl FromStr for Distance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cosine" => Ok(Self::Cosine),
            "euclidean" | "euclid" => Ok(Self::Euclidean),
            "dot" => Ok(Self::Dot),
            other => Err(format!("Unknown distance metric: {other}")),
        }
    }
}

/// Exact-match payload filter; every condition must hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub must: Vec<(String, serde_json::Value)>,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn must_match(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.must.push((key.into(), value.into()));
        self
    }

    /// Check a point payload against the filter. Keys are looked up at the
    /// top level first and then inside the nested `metadata` object.
    pub fn matches(&self, payload: &serde_json::Value) -> bool {
        self.must.iter().all(|(key, expected)| {
            payload
                .get(key)
                .or_else(|| payload.get("metadata").and_then(|m| m.get(key)))
                == Some(expected)
        })
    }
}

/// Statistics about a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub vectors_count: u64,
    pub status: String,
    pub vector_size: usize,
    pub distance: Distance,
}
