//! Document ingestion: load, chunk, embed and store one document.

use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::adapters::loader::file::file_type;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CollectionInfo, Distance, Document, Metadata};
use crate::domain::ports::{DocumentLoader, EmbeddingProvider, InputType, VectorStore};
use crate::services::chunker::Chunker;

/// Most chunks a single document may produce.
pub const MAX_CHUNKS: usize = 1000;

/// Drives load → chunk → embed → store for single documents.
///
/// A failure after some upsert batches succeeded leaves those points in the
/// collection; nothing is rolled back.
pub struct DocumentProcessingService {
    loader: Arc<dyn DocumentLoader>,
    chunker: Chunker,
    embeddings: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    collection: String,
    upsert_batch_size: usize,
}

impl DocumentProcessingService {
    pub fn new(
        loader: Arc<dyn DocumentLoader>,
        chunker: Chunker,
        embeddings: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
    ) -> Self {
        let collection = collection.into();
        info!(
            collection = %collection,
            strategy = %chunker.strategy(),
            "initialized document processing service"
        );
        Self {
            loader,
            chunker,
            embeddings,
            store,
            collection,
            upsert_batch_size: 100,
        }
    }

    /// Points per upsert call. Values below 1 are treated as 1.
    #[must_use]
    pub fn with_upsert_batch_size(mut self, size: usize) -> Self {
        self.upsert_batch_size = size.max(1);
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Reuse the collection if it exists, otherwise create it with the
    /// embedder's dimension and cosine distance.
    async fn ensure_collection(&self) -> DomainResult<()> {
        match self.store.collection_info(&self.collection).await {
            Ok(_) => {
                info!("Collection '{}' already exists", self.collection);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                self.store
                    .create_collection(
                        &self.collection,
                        self.embeddings.dimension(),
                        Distance::Cosine,
                    )
                    .await?;
                info!("Created collection '{}'", self.collection);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Ingest the document at `path`.
    ///
    /// Every failure comes back as [`DomainError::DocumentProcessing`] naming
    /// the path.
    #[instrument(skip(self, path), fields(path = %path.display(), collection = %self.collection))]
    pub async fn process(&self, path: &Path) -> DomainResult<Document> {
        let source = path.display().to_string();
        self.process_inner(path, &source).await.map_err(|e| {
            let err = e.in_document(&source);
            error!(error = %err, "document processing failed");
            err
        })
    }

    async fn process_inner(&self, path: &Path, source: &str) -> DomainResult<Document> {
        info!("Processing document: {source}");

        let fragments = self.loader.load(path).await?;
        info!("Loaded {} raw fragments", fragments.len());
        if fragments.is_empty() {
            return Err(DomainError::document(source, "no content could be loaded"));
        }

        let chunks = self.chunker.chunk(&fragments);
        if chunks.is_empty() {
            return Err(DomainError::document(
                source,
                format!("No chunks generated from {source}"),
            ));
        }
        if chunks.len() > MAX_CHUNKS {
            return Err(DomainError::document(
                source,
                format!(
                    "Document produced too many chunks: {}. Max allowed: {MAX_CHUNKS}",
                    chunks.len()
                ),
            ));
        }

        self.ensure_collection().await?;

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let batch = self.embeddings.embed(&texts, InputType::Document).await?;
        if batch.vectors.len() != chunks.len() {
            return Err(DomainError::Validation(format!(
                "Embedding count mismatch: {} vectors for {} chunks",
                batch.vectors.len(),
                chunks.len()
            )));
        }
        info!("Generated {} embeddings", batch.vectors.len());

        let payloads: Vec<Value> = chunks
            .iter()
            .map(|c| json!({"text": c.text, "metadata": c.metadata}))
            .collect();

        let mut stored = 0;
        for (vectors, payloads) in batch
            .vectors
            .chunks(self.upsert_batch_size)
            .zip(payloads.chunks(self.upsert_batch_size))
        {
            stored += self
                .store
                .upsert(&self.collection, vectors.to_vec(), payloads.to_vec(), None)
                .await?;
        }
        info!("Stored {stored} chunks in vector store");

        let mut metadata = Metadata::new();
        metadata.insert("num_chunks".to_string(), json!(chunks.len()));
        metadata.insert("total_tokens".to_string(), json!(batch.tokens_used));
        metadata.insert("file_type".to_string(), json!(file_type(path)));

        info!("Successfully processed document: {source}");
        Ok(Document {
            path: source.to_string(),
            chunks,
            metadata,
        })
    }

    pub async fn collection_info(&self) -> DomainResult<CollectionInfo> {
        self.store.collection_info(&self.collection).await
    }

    /// Drop the collection and every stored point.
    pub async fn reset(&self) -> DomainResult<()> {
        self.store.delete_collection(&self.collection).await
    }
}
