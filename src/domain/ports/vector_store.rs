//! Vector store port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{CollectionInfo, Distance, SearchFilter, SearchResult};

/// Named collections of vectors with JSON payloads.
///
/// Stored payloads have the shape `{"text": ..., "metadata": {...}}`; search
/// results read their text from the `text` field.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a collection. Creating an existing collection is not an error.
    async fn create_collection(
        &self,
        name: &str,
        vector_size: usize,
        distance: Distance,
    ) -> DomainResult<()>;

    /// Insert or replace points. `vectors` and `payloads` must have the same
    /// length, as must `ids` when given. Returns the number of points written.
    async fn upsert(
        &self,
        collection: &str,
        vectors: Vec<Vec<f32>>,
        payloads: Vec<serde_json::Value>,
        ids: Option<Vec<String>>,
    ) -> DomainResult<usize>;

    /// Nearest neighbours of `query`, best first.
    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        limit: usize,
        filter: Option<&SearchFilter>,
    ) -> DomainResult<Vec<SearchResult>>;

    async fn collection_info(&self, name: &str) -> DomainResult<CollectionInfo>;

    async fn delete_collection(&self, name: &str) -> DomainResult<()>;
}
