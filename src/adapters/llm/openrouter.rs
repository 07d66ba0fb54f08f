//! OpenRouter chat-completions adapter.
//!
//! Speaks the OpenAI-compatible `/chat/completions` protocol, so it also
//! works against any other server exposing that endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::adapters::retry::RetryPolicy;
use crate::domain::errors::{DomainError, DomainResult, ProviderError};
use crate::domain::models::{ConversationMessage, Metadata, Role};
use crate::domain::ports::{Generation, GenerationParams, LanguageModel};

const PROVIDER: &str = "OpenRouter";

/// Configuration for the OpenRouter client.
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    pub api_key: String,
    /// Default: `https://openrouter.ai/api/v1`.
    pub base_url: String,
    pub model: String,
    /// Request timeout in seconds. Default: 60.
    pub timeout_secs: u64,
    pub site_url: Option<String>,
    pub site_name: Option<String>,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: String::new(),
            timeout_secs: 60,
            site_url: None,
            site_name: None,
        }
    }
}

/// Chat-completions client.
pub struct OpenRouterClient {
    config: OpenRouterConfig,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl OpenRouterClient {
    pub fn new(config: OpenRouterConfig, retry: RetryPolicy) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        info!(model = %config.model, "initialized OpenRouter provider");
        Ok(Self {
            config,
            client,
            retry,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    async fn send_once(&self, request: &ChatCompletionRequest<'_>) -> Result<Generation, ProviderError> {
        let mut builder = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .header("Content-Type", "application/json");
        if let Some(url) = &self.config.site_url {
            builder = builder.header("HTTP-Referer", url);
        }
        if let Some(name) = &self.config.site_name {
            builder = builder.header("X-Title", name);
        }

        let response = builder
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, self.config.timeout_secs, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            error!(status = status.as_u16(), "OpenRouter API error");
            return Err(ProviderError::Api {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let data: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, self.config.timeout_secs, &e))?;

        parse_completion(data, &self.config.model)
    }
}

fn parse_completion(data: ChatCompletionResponse, fallback_model: &str) -> Result<Generation, ProviderError> {
    if let Some(err) = data.error {
        return Err(ProviderError::InvalidResponse {
            provider: PROVIDER.to_string(),
            message: format!("OpenRouter returned error: {err}"),
        });
    }

    let choice = data
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::InvalidResponse {
            provider: PROVIDER.to_string(),
            message: "response contained no choices".to_string(),
        })?;

    let usage = data.usage.unwrap_or_default();
    let mut metadata = Metadata::new();
    metadata.insert("prompt_tokens".to_string(), usage.prompt_tokens.into());
    metadata.insert("completion_tokens".to_string(), usage.completion_tokens.into());
    metadata.insert("id".to_string(), data.id.unwrap_or_default().into());
    metadata.insert(
        "model".to_string(),
        data.model.unwrap_or_else(|| fallback_model.to_string()).into(),
    );

    Ok(Generation {
        text: choice.message.content.unwrap_or_default(),
        tokens_used: usage.total_tokens,
        finish_reason: choice.finish_reason.unwrap_or_else(|| "unknown".to_string()),
        metadata,
    })
}

#[async_trait]
impl LanguageModel for OpenRouterClient {
    fn model_id(&self) -> &str {
        &self.config.model
    }

    async fn generate(
        &self,
        messages: &[ConversationMessage],
        params: GenerationParams,
    ) -> DomainResult<Generation> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role,
                    content: &m.content,
                })
                .collect(),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        debug!(model = %self.config.model, messages = messages.len(), "sending chat completion");
        let generation = self.retry.execute(|| self.send_once(&request)).await?;
        info!(
            tokens = generation.tokens_used,
            finish_reason = %generation.finish_reason,
            "generated response"
        );
        Ok(generation)
    }
}

// -- OpenAI-compatible request/response types --

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    id: Option<String>,
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}
