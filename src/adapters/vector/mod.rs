//! Vector store adapters.

pub mod memory;
pub mod qdrant;

pub use memory::InMemoryVectorStore;
pub use qdrant::{QdrantConfig, QdrantVectorStore};

use crate::domain::models::{Metadata, SearchResult};

/// Turn a stored `{text, metadata}` payload into a search hit.
///
/// Payloads without a nested `metadata` object expose the whole payload as
/// metadata.
pub(crate) fn result_from_payload(payload: &serde_json::Value, score: f32) -> SearchResult {
    let text = payload
        .get("text")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string();
    let metadata = payload
        .get("metadata")
        .and_then(serde_json::Value::as_object)
        .or_else(|| payload.as_object())
        .cloned()
        .unwrap_or_else(Metadata::new);
    SearchResult {
        text,
        score,
        metadata,
    }
}
