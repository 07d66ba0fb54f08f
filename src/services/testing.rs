//! Port fakes shared by service unit tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::domain::errors::{DomainError, DomainResult, ProviderError};
use crate::domain::models::{ConversationMessage, Metadata};
use crate::domain::ports::{
    EmbeddingBatch, EmbeddingProvider, Generation, GenerationParams, InputType, LanguageModel,
};

pub const DIM: usize = 16;

/// Deterministic bag-of-words embedder: each word bumps one of `DIM` buckets.
#[derive(Default)]
pub struct HashEmbedder {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl HashEmbedder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0; DIM];
        for word in text.split_whitespace() {
            let word = word.to_lowercase();
            let bucket = word.bytes().fold(7usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize));
            v[bucket % DIM] += 1.0;
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn model_name(&self) -> &str {
        "hash-embedder"
    }

    fn dimension(&self) -> usize {
        DIM
    }

    async fn embed(&self, texts: &[String], _input_type: InputType) -> DomainResult<EmbeddingBatch> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::Timeout {
                provider: "hash".to_string(),
                seconds: 1,
            }
            .into());
        }
        Ok(EmbeddingBatch {
            vectors: texts.iter().map(|t| Self::vector(t)).collect(),
            dimension: DIM,
            tokens_used: texts.iter().map(|t| t.split_whitespace().count() as u64).sum(),
        })
    }
}

/// Language model replaying canned replies in order.
///
/// An `Err` entry fails that call. Once the script runs out every call
/// fails.
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

    pub fn push_error(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
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
                tokens_used: 10,
                finish_reason: "stop".to_string(),
                metadata: Metadata::new(),
            }),
            Some(Err(message)) => Err(ProviderError::Api {
                provider: "scripted".to_string(),
                status: 500,
                body: message,
            }
            .into()),
            None => Err(DomainError::Validation("script exhausted".to_string())),
        }
    }
}
