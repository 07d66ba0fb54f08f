//! Voyage AI embedding provider adapter.
//!
//! `voyage-context-3` goes through the `/contextualizedembeddings` endpoint,
//! which embeds every text of a call as a chunk of one shared document. All
//! other models use the plain `/embeddings` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::adapters::retry::RetryPolicy;
use crate::domain::errors::{DomainError, DomainResult, ProviderError};
use crate::domain::ports::{EmbeddingBatch, EmbeddingProvider, InputType};

const PROVIDER: &str = "VoyageAI";

/// Model served by the contextualized endpoint.
pub const CONTEXTUAL_MODEL: &str = "voyage-context-3";

/// Output dimension of known Voyage models; unknown models default to 1024.
pub fn dimension_for_model(model: &str) -> usize {
    match model {
        "voyage-code-2" | "voyage-large-2" => 1536,
        _ => 1024,
    }
}

/// Configuration for the Voyage AI embedding provider.
#[derive(Debug, Clone)]
pub struct VoyageConfig {
    pub api_key: String,
    /// Default: `https://api.voyageai.com/v1`.
    pub base_url: String,
    /// Default: `voyage-context-3`.
    pub model: String,
    /// Derived from the model when unset.
    pub dimension: Option<usize>,
    /// Request timeout in seconds. Default: 60.
    pub timeout_secs: u64,
}

impl Default for VoyageConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.voyageai.com/v1".to_string(),
            model: CONTEXTUAL_MODEL.to_string(),
            dimension: None,
            timeout_secs: 60,
        }
    }
}

/// Voyage AI embedding provider.
pub struct VoyageEmbeddingProvider {
    config: VoyageConfig,
    dimension: usize,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl VoyageEmbeddingProvider {
    pub fn new(config: VoyageConfig, retry: RetryPolicy) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::Configuration(format!("Failed to build HTTP client: {e}")))?;
        let dimension = config
            .dimension
            .unwrap_or_else(|| dimension_for_model(&config.model));

        info!(model = %config.model, dimension, "initialized Voyage AI provider");
        Ok(Self {
            config,
            dimension,
            client,
            retry,
        })
    }

    fn is_contextual(&self) -> bool {
        self.config.model == CONTEXTUAL_MODEL
    }

    fn endpoint(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        if self.is_contextual() {
            format!("{base}/contextualizedembeddings")
        } else {
            format!("{base}/embeddings")
        }
    }

    async fn send_once(&self, body: &serde_json::Value) -> Result<EmbeddingBatch, ProviderError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, self.config.timeout_secs, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            error!(status = status.as_u16(), "Voyage AI API error");
            return Err(ProviderError::Api {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, self.config.timeout_secs, &e))?;

        parse_embeddings(data, self.is_contextual(), self.dimension)
    }
}

fn invalid(message: impl Into<String>) -> ProviderError {
    ProviderError::InvalidResponse {
        provider: PROVIDER.to_string(),
        message: message.into(),
    }
}

fn parse_embeddings(
    data: serde_json::Value,
    contextual: bool,
    default_dimension: usize,
) -> Result<EmbeddingBatch, ProviderError> {
    if let Some(err) = data.get("error") {
        return Err(invalid(format!("Voyage AI returned error: {err}")));
    }

    let tokens_used = data
        .pointer("/usage/total_tokens")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(0);

    let vectors: Vec<Vec<f32>> = if contextual {
        let response: ContextualResponse =
            serde_json::from_value(data).map_err(|e| invalid(e.to_string()))?;
        response
            .data
            .into_iter()
            .flat_map(|doc| sorted(doc.data))
            .collect()
    } else {
        let response: StandardResponse =
            serde_json::from_value(data).map_err(|e| invalid(e.to_string()))?;
        sorted(response.data)
    };

    let dimension = vectors.first().map_or(default_dimension, Vec::len);
    Ok(EmbeddingBatch {
        vectors,
        dimension,
        tokens_used,
    })
}

fn sorted(mut items: Vec<EmbeddingItem>) -> Vec<Vec<f32>> {
    items.sort_by_key(|item| item.index);
    items.into_iter().map(|item| item.embedding).collect()
}

#[async_trait]
impl EmbeddingProvider for VoyageEmbeddingProvider {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, texts: &[String], input_type: InputType) -> DomainResult<EmbeddingBatch> {
        if texts.is_empty() {
            return Err(DomainError::Validation(
                "No texts provided for embedding".to_string(),
            ));
        }

        let body = if self.is_contextual() {
            serde_json::to_value(ContextualRequest {
                model: &self.config.model,
                inputs: vec![texts],
                input_type,
            })?
        } else {
            serde_json::to_value(StandardRequest {
                model: &self.config.model,
                input: texts,
                input_type,
            })?
        };

        debug!(model = %self.config.model, endpoint = %self.endpoint(), count = texts.len(), "sending embedding request");
        let batch = self.retry.execute(|| self.send_once(&body)).await?;

        if batch.vectors.len() != texts.len() {
            return Err(invalid(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                batch.vectors.len()
            ))
            .into());
        }

        info!(
            "Generated {} embeddings: {} tokens",
            batch.vectors.len(),
            batch.tokens_used
        );
        Ok(batch)
    }
}

// -- Voyage API request/response types --

#[derive(Debug, Serialize)]
struct StandardRequest<'a> {
    model: &'a str,
    input: &'a [String],
    input_type: InputType,
}

#[derive(Debug, Serialize)]
struct ContextualRequest<'a> {
    model: &'a str,
    inputs: Vec<&'a [String]>,
    input_type: InputType,
}

#[derive(Debug, Deserialize)]
struct StandardResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct ContextualResponse {
    data: Vec<ContextualDocument>,
}

#[derive(Debug, Deserialize)]
struct ContextualDocument {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}
