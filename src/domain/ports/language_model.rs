//! Language model port.
//!
//! A language model turns an ordered message list into a single completion.
//! Tool calls, if any, are encoded in the completion text and interpreted by
//! the agent loop, not by the model adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainResult;
use crate::domain::models::{ConversationMessage, Metadata};

/// Sampling parameters for a single generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 4000,
        }
    }
}

/// Completion returned by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    pub tokens_used: u32,
    pub finish_reason: String,
    /// Provider-specific details (token breakdown, response id, ...)
    #[serde(default)]
    pub metadata: Metadata,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Identifier of the model actually used for generation.
    fn model_id(&self) -> &str;

    /// Generate a completion for `messages`.
    ///
    /// Fails with a provider error on timeout, transport failure or
    /// non-success status.
    async fn generate(
        &self,
        messages: &[ConversationMessage],
        params: GenerationParams,
    ) -> DomainResult<Generation>;
}
