//! Wires configuration into adapters and services.

use std::sync::Arc;
use tracing::info;

use crate::adapters::embeddings::{VoyageConfig, VoyageEmbeddingProvider};
use crate::adapters::llm::{OpenRouterClient, OpenRouterConfig};
use crate::adapters::loader::FileDocumentLoader;
use crate::adapters::retry::RetryPolicy;
use crate::adapters::vector::{InMemoryVectorStore, QdrantConfig, QdrantVectorStore};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Config;
use crate::domain::ports::{EmbeddingProvider, GenerationParams, LanguageModel, VectorStore};
use crate::services::{AgentLoop, ChatService, Chunker, DocumentProcessingService, RetrievalTool};

/// Builds the object graph described by a [`Config`].
pub struct ServiceFactory {
    config: Config,
}

/// Read a required API key from the environment.
fn required_key(var: &str) -> DomainResult<String> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(DomainError::Configuration(format!(
            "Missing API key: set the {var} environment variable"
        ))),
    }
}

impl ServiceFactory {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn retry(&self) -> RetryPolicy {
        RetryPolicy::from_config(&self.config.retry)
    }

    pub fn language_model(&self) -> DomainResult<Arc<dyn LanguageModel>> {
        let llm = &self.config.llm;
        let client = OpenRouterClient::new(
            OpenRouterConfig {
                api_key: required_key(&llm.api_key_env)?,
                base_url: llm.base_url.clone(),
                model: llm.model.clone(),
                timeout_secs: llm.timeout_secs,
                site_url: llm.site_url.clone(),
                site_name: llm.site_name.clone(),
            },
            self.retry(),
        )?;
        Ok(Arc::new(client))
    }

    pub fn embedding_provider(&self) -> DomainResult<Arc<dyn EmbeddingProvider>> {
        let emb = &self.config.embeddings;
        match emb.provider.as_str() {
            "voyageai" => {
                let provider = VoyageEmbeddingProvider::new(
                    VoyageConfig {
                        api_key: required_key(&emb.api_key_env)?,
                        base_url: emb.base_url.clone(),
                        model: emb.model.clone(),
                        dimension: emb.dimension,
                        timeout_secs: emb.timeout_secs,
                    },
                    self.retry(),
                )?;
                Ok(Arc::new(provider))
            }
            other => Err(DomainError::Configuration(format!(
                "Unknown embeddings provider: {other}"
            ))),
        }
    }

    pub fn vector_store(&self) -> DomainResult<Arc<dyn VectorStore>> {
        let db = &self.config.vector_db;
        match db.provider.as_str() {
            "qdrant" => {
                // The key is optional for local Qdrant instances
                let api_key = std::env::var(&db.api_key_env)
                    .ok()
                    .filter(|key| !key.trim().is_empty());
                let store = QdrantVectorStore::new(
                    QdrantConfig {
                        url: db.url.clone(),
                        api_key,
                        timeout_secs: db.timeout_secs,
                    },
                    self.retry(),
                )?;
                Ok(Arc::new(store))
            }
            "memory" => Ok(Arc::new(InMemoryVectorStore::new())),
            other => Err(DomainError::Configuration(format!(
                "Unknown vector_db provider: {other}"
            ))),
        }
    }

    /// Build the chat service from the configured adapters.
    pub fn chat_service(&self) -> DomainResult<ChatService> {
        self.chat_service_with(
            self.language_model()?,
            self.embedding_provider()?,
            self.vector_store()?,
        )
    }

    /// Build the chat service around the given collaborators.
    pub fn chat_service_with(
        &self,
        model: Arc<dyn LanguageModel>,
        embeddings: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
    ) -> DomainResult<ChatService> {
        let config = &self.config;
        let collection = config.vector_db.collection_name.clone();

        let tool = RetrievalTool::new(embeddings.clone(), store.clone(), collection.clone())
            .with_limit(config.agent.search_limit);
        let agent = AgentLoop::new(model.clone(), Arc::new(tool))
            .with_params(GenerationParams {
                temperature: config.agent.temperature,
                max_tokens: config.agent.max_tokens,
            })
            .with_max_rounds(config.agent.max_rounds);

        let ingestion = DocumentProcessingService::new(
            Arc::new(FileDocumentLoader::new()),
            Chunker::from_config(&config.chunking)?,
            embeddings.clone(),
            store,
            collection,
        )
        .with_upsert_batch_size(config.vector_db.upsert_batch_size);

        info!(
            llm = model.model_id(),
            embeddings = embeddings.model_name(),
            vector_db = %config.vector_db.provider,
            "services wired"
        );

        Ok(ChatService::new(model, agent, ingestion, embeddings.model_name()).with_params(
            GenerationParams {
                temperature: config.llm.temperature,
                max_tokens: config.llm.max_tokens,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        let mut config = Config::default();
        config.llm.model = "test/model".to_string();
        config.llm.api_key_env = "DOCCHAT_TEST_LLM_KEY".to_string();
        config.embeddings.api_key_env = "DOCCHAT_TEST_VOYAGE_KEY".to_string();
        config
    }

    #[test]
    fn test_missing_llm_key_is_configuration_error() {
        let factory = ServiceFactory::new(config());
        let result = temp_env::with_var_unset("DOCCHAT_TEST_LLM_KEY", || factory.language_model());
        let Err(err) = result else {
            panic!("expected a configuration error");
        };
        assert!(matches!(err, DomainError::Configuration(_)));
        assert!(err.to_string().contains("DOCCHAT_TEST_LLM_KEY"));
    }

    #[test]
    fn test_builds_adapters_with_keys() {
        let factory = ServiceFactory::new(config());
        temp_env::with_vars(
            [
                ("DOCCHAT_TEST_LLM_KEY", Some("llm-key")),
                ("DOCCHAT_TEST_VOYAGE_KEY", Some("voyage-key")),
            ],
            || {
                let model = factory.language_model().unwrap();
                assert_eq!(model.model_id(), "test/model");
                let embeddings = factory.embedding_provider().unwrap();
                assert_eq!(embeddings.dimension(), 1024);
            },
        );
    }

    #[test]
    fn test_memory_store_needs_no_key() {
        let mut config = config();
        config.vector_db.provider = "memory".to_string();
        assert!(ServiceFactory::new(config).vector_store().is_ok());
    }
}
