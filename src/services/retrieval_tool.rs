//! Retrieval tool exposed to the agent loop.
//!
//! Never fails: embedding or search errors come back as readable tool
//! output so the model can keep reasoning.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::SearchResult;
use crate::domain::ports::{EmbeddingProvider, InputType, VectorStore};
use crate::infrastructure::logging::scrub;

/// Tool output when the store has no match.
pub const NO_RESULTS: &str = "No relevant information found for this query.";

/// Raw results of every search run during one user turn.
#[derive(Debug, Default, Clone)]
pub struct SearchLog {
    results: Vec<SearchResult>,
}

impl SearchLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, results: &[SearchResult]) {
        self.results.extend_from_slice(results);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }
}

pub struct RetrievalTool {
    embeddings: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    collection: String,
    limit: usize,
}

impl RetrievalTool {
    pub fn new(
        embeddings: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            embeddings,
            store,
            collection: collection.into(),
            limit: 5,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub const fn limit(&self) -> usize {
        self.limit
    }

    async fn lookup(&self, query: &str) -> DomainResult<Vec<SearchResult>> {
        let batch = self
            .embeddings
            .embed(&[query.to_string()], InputType::Query)
            .await?;
        let Some(vector) = batch.vectors.first() else {
            return Ok(Vec::new());
        };
        self.store
            .search(&self.collection, vector, self.limit, None)
            .await
    }

    /// Run a search and render the hits as model context.
    ///
    /// Raw hits are appended to `log`.
    pub async fn search(&self, query: &str, log: &mut SearchLog) -> String {
        info!(query, "executing document search");

        let results = match self.lookup(query).await {
            Ok(results) => results,
            Err(e) => {
                let message = scrub(&e.to_string());
                error!(error = %message, "document search failed");
                return format!("Error performing search: {message}");
            }
        };
        log.record(&results);

        if results.is_empty() {
            warn!(query, "no results found");
            return NO_RESULTS.to_string();
        }

        info!("Retrieved {} chunks", results.len());
        for (i, hit) in results.iter().enumerate() {
            let preview: String = hit.text.chars().take(100).collect();
            info!(
                "  Source {}: {}... (score: {:.4})",
                i + 1,
                preview.replace('\n', " "),
                hit.score
            );
        }

        render(&results)
    }
}

fn render(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, hit)| format!("Source {}:\n{}", i + 1, hit.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}
