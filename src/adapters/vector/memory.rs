//! In-memory [`VectorStore`] for tests and local runs without a database.
//!
//! Collections live behind a `tokio::sync::RwLock`. Search is a brute-force
//! scan over every point of the collection.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult, ProviderError};
use crate::domain::models::{CollectionInfo, Distance, SearchFilter, SearchResult};
use crate::domain::ports::VectorStore;

use super::result_from_payload;

const PROVIDER: &str = "memory";

struct Point {
    id: String,
    vector: Vec<f32>,
    payload: serde_json::Value,
}

struct Collection {
    vector_size: usize,
    distance: Distance,
    points: Vec<Point>,
}

/// Vector store kept entirely in process memory.
#[derive(Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of points stored in `name`, or 0 when it does not exist.
    pub async fn len(&self, name: &str) -> usize {
        self.collections
            .read()
            .await
            .get(name)
            .map_or(0, |c| c.points.len())
    }

    pub async fn is_empty(&self, name: &str) -> bool {
        self.len(name).await == 0
    }
}

fn not_found(name: &str) -> DomainError {
    ProviderError::Api {
        provider: PROVIDER.to_string(),
        status: 404,
        body: format!("Collection '{name}' not found"),
    }
    .into()
}

pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;
    if denom < f32::EPSILON {
        0.0
    } else {
        dot / denom
    }
}

fn score(distance: Distance, a: &[f32], b: &[f32]) -> f32 {
    match distance {
        Distance::Cosine => cosine_similarity(a, b),
        Distance::Dot => a.iter().zip(b).map(|(x, y)| x * y).sum(),
        // Negated so that higher still means closer.
        Distance::Euclidean => -a
            .iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt(),
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(
        &self,
        name: &str,
        vector_size: usize,
        distance: Distance,
    ) -> DomainResult<()> {
        let mut collections = self.collections.write().await;
        collections.entry(name.to_string()).or_insert_with(|| {
            tracing::info!(collection = name, vector_size, %distance, "created collection");
            Collection {
                vector_size,
                distance,
                points: Vec::new(),
            }
        });
        Ok(())
    }

    async fn upsert(
        &self,
        collection: &str,
        vectors: Vec<Vec<f32>>,
        payloads: Vec<serde_json::Value>,
        ids: Option<Vec<String>>,
    ) -> DomainResult<usize> {
        if vectors.len() != payloads.len() {
            return Err(DomainError::Validation(format!(
                "Number of vectors ({}) must match number of payloads ({})",
                vectors.len(),
                payloads.len()
            )));
        }
        let ids = match ids {
            Some(ids) if ids.len() != vectors.len() => {
                return Err(DomainError::Validation(format!(
                    "Number of ids ({}) must match number of vectors ({})",
                    ids.len(),
                    vectors.len()
                )));
            }
            Some(ids) => ids,
            None => (0..vectors.len())
                .map(|_| Uuid::new_v4().to_string())
                .collect(),
        };

        let mut collections = self.collections.write().await;
        let target = collections
            .get_mut(collection)
            .ok_or_else(|| not_found(collection))?;

        if let Some(bad) = vectors.iter().find(|v| v.len() != target.vector_size) {
            return Err(DomainError::Validation(format!(
                "Vector size {} does not match collection size {}",
                bad.len(),
                target.vector_size
            )));
        }

        let written = vectors.len();
        for ((id, vector), payload) in ids.into_iter().zip(vectors).zip(payloads) {
            target.points.retain(|p| p.id != id);
            target.points.push(Point {
                id,
                vector,
                payload,
            });
        }
        Ok(written)
    }

    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        limit: usize,
        filter: Option<&SearchFilter>,
    ) -> DomainResult<Vec<SearchResult>> {
        let collections = self.collections.read().await;
        let target = collections
            .get(collection)
            .ok_or_else(|| not_found(collection))?;

        let mut scored: Vec<(f32, &Point)> = target
            .points
            .iter()
            .filter(|p| filter.map_or(true, |f| f.matches(&p.payload)))
            .map(|p| (score(target.distance, query, &p.vector), p))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(score, point)| result_from_payload(&point.payload, score))
            .collect())
    }

    async fn collection_info(&self, name: &str) -> DomainResult<CollectionInfo> {
        let collections = self.collections.read().await;
        let target = collections.get(name).ok_or_else(|| not_found(name))?;
        Ok(CollectionInfo {
            name: name.to_string(),
            vectors_count: target.points.len() as u64,
            status: "green".to_string(),
            vector_size: target.vector_size,
            distance: target.distance,
        })
    }

    async fn delete_collection(&self, name: &str) -> DomainResult<()> {
        self.collections.write().await.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(text: &str, source: &str) -> serde_json::Value {
        json!({"text": text, "metadata": {"source": source}})
    }

    async fn seeded() -> InMemoryVectorStore {
        let store = InMemoryVectorStore::new();
        store
            .create_collection("docs", 2, Distance::Cosine)
            .await
            .unwrap();
        store
            .upsert(
                "docs",
                vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]],
                vec![
                    payload("east", "a.md"),
                    payload("north", "b.md"),
                    payload("north-east", "a.md"),
                ],
                None,
            )
            .await
            .unwrap();
        store
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).abs() < f32::EPSILON);
        assert!(cosine_similarity(&[1.0], &[1.0, 0.0]).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_search_orders_by_score() {
        let store = seeded().await;
        let results = store.search("docs", &[1.0, 0.1], 2, None).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "east");
        assert_eq!(results[1].text, "north-east");
        assert!(results[0].score >= results[1].score);
        assert_eq!(results[0].metadata["source"], json!("a.md"));
    }

    #[tokio::test]
    async fn test_search_with_filter() {
        let store = seeded().await;
        let filter = SearchFilter::new().must_match("source", "b.md");
        let results = store
            .search("docs", &[1.0, 0.0], 5, Some(&filter))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "north");
    }

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let store = seeded().await;
        store
            .create_collection("docs", 2, Distance::Cosine)
            .await
            .unwrap();
        assert_eq!(store.len("docs").await, 3);
    }

    #[tokio::test]
    async fn test_upsert_length_mismatch() {
        let store = seeded().await;
        let err = store
            .upsert("docs", vec![vec![1.0, 0.0]], vec![], None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_id() {
        let store = seeded().await;
        let ids = Some(vec!["p1".to_string()]);
        store
            .upsert("docs", vec![vec![1.0, 0.0]], vec![payload("v1", "x")], ids.clone())
            .await
            .unwrap();
        store
            .upsert("docs", vec![vec![1.0, 0.0]], vec![payload("v2", "x")], ids)
            .await
            .unwrap();
        assert_eq!(store.len("docs").await, 4);
    }

    #[tokio::test]
    async fn test_missing_collection_is_provider_error() {
        let store = InMemoryVectorStore::new();
        let err = store.collection_info("nope").await.unwrap_err();
        assert!(matches!(err, DomainError::Provider(ProviderError::Api { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_info_and_delete() {
        let store = seeded().await;
        let info = store.collection_info("docs").await.unwrap();
        assert_eq!(info.vectors_count, 3);
        assert_eq!(info.vector_size, 2);
        assert_eq!(info.distance, Distance::Cosine);

        store.delete_collection("docs").await.unwrap();
        assert!(store.collection_info("docs").await.is_err());
    }
}
