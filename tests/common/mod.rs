//! Common test utilities for integration tests
//!
//! Port fakes and fixtures shared across integration test files.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use docchat::domain::models::{Config, ConversationMessage, Metadata};
use docchat::domain::ports::{
    EmbeddingBatch, EmbeddingProvider, Generation, GenerationParams, InputType, LanguageModel,
};
use docchat::{ChatService, DomainError, DomainResult, ProviderError, ServiceFactory};
use docchat::adapters::vector::InMemoryVectorStore;

pub const DIM: usize = 32;

/// Deterministic bag-of-words embedder.
#[derive(Default)]
pub struct BagOfWords;

impl BagOfWords {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0; DIM];
        for word in text.split_whitespace() {
            let word = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            let bucket = word
                .bytes()
                .fold(17usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize));
            v[bucket % DIM] += 1.0;
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for BagOfWords {
    fn model_name(&self) -> &str {
        "bag-of-words"
    }

    fn dimension(&self) -> usize {
        DIM
    }

    async fn embed(&self, texts: &[String], _input_type: InputType) -> DomainResult<EmbeddingBatch> {
        Ok(EmbeddingBatch {
            vectors: texts.iter().map(|t| Self::vector(t)).collect(),
            dimension: DIM,
            tokens_used: texts.iter().map(|t| t.split_whitespace().count() as u64).sum(),
        })
    }
}

/// Language model replaying canned replies; `Err` entries fail that call.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    pub seen: Mutex<Vec<Vec<ConversationMessage>>>,
}

impl ScriptedModel {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn push_reply(&self, reply: &str) {
        self.replies.lock().unwrap().push_back(Ok(reply.to_string()));
    }

    pub fn push_error(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    /// Messages sent on the most recent call.
    pub fn last_request(&self) -> Vec<ConversationMessage> {
        self.seen.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn model_id(&self) -> &str {
        "scripted-model"
    }

    async fn generate(
        &self,
        messages: &[ConversationMessage],
        _params: GenerationParams,
    ) -> DomainResult<Generation> {
        self.seen.lock().unwrap().push(messages.to_vec());
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(Generation {
                text,
                tokens_used: 12,
                finish_reason: "stop".to_string(),
                metadata: Metadata::new(),
            }),
            Some(Err(body)) => Err(ProviderError::Api {
                provider: "scripted".to_string(),
                status: 503,
                body,
            }
            .into()),
            None => Err(DomainError::Validation("script exhausted".to_string())),
        }
    }
}

/// Configuration for an in-memory deployment.
pub fn memory_config() -> Config {
    let mut config = Config::default();
    config.llm.model = "scripted-model".to_string();
    config.vector_db.provider = "memory".to_string();
    config.vector_db.collection_name = "docs".to_string();
    config
}

/// Chat service over the in-memory store with scripted collaborators.
pub fn chat_service(config: Config, model: Arc<ScriptedModel>) -> ChatService {
    ServiceFactory::new(config)
        .chat_service_with(
            model,
            Arc::new(BagOfWords),
            Arc::new(InMemoryVectorStore::new()),
        )
        .expect("chat service should build")
}

/// Setup test logging
#[allow(dead_code)]
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
