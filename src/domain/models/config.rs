use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::chunking::ChunkingConfig;

/// Main configuration structure for docchat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Chat-completions model configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Agent loop parameters for RAG turns
    #[serde(default)]
    pub agent: AgentConfig,

    /// Embedding provider configuration
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,

    /// Vector database configuration
    #[serde(default)]
    pub vector_db: VectorDbConfig,

    /// Document chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Retry policy for external calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Language model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LlmConfig {
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// Model identifier; must be set explicitly
    #[serde(default)]
    pub model: String,

    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,

    /// Temperature for plain (non-RAG) turns
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,

    /// Sent as `HTTP-Referer` when set
    #[serde(default)]
    pub site_url: Option<String>,

    /// Sent as `X-Title` when set
    #[serde(default)]
    pub site_name: Option<String>,
}

fn default_llm_provider() -> String {
    "openrouter".to_string()
}

fn default_llm_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_llm_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

const fn default_llm_temperature() -> f32 {
    0.7
}

const fn default_max_tokens() -> u32 {
    4000
}

const fn default_llm_timeout_secs() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: String::new(),
            base_url: default_llm_base_url(),
            api_key_env: default_llm_api_key_env(),
            temperature: default_llm_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout_secs(),
            site_url: None,
            site_name: None,
        }
    }
}

/// Agent loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AgentConfig {
    #[serde(default = "default_agent_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Maximum number of model calls per turn
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,

    /// Results returned per retrieval call
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

const fn default_agent_temperature() -> f32 {
    0.1
}

const fn default_max_rounds() -> usize {
    6
}

const fn default_search_limit() -> usize {
    5
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            temperature: default_agent_temperature(),
            max_tokens: default_max_tokens(),
            max_rounds: default_max_rounds(),
            search_limit: default_search_limit(),
        }
    }
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EmbeddingsConfig {
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,

    #[serde(default = "default_embedding_api_key_env")]
    pub api_key_env: String,

    /// Overrides the dimension derived from the model name
    #[serde(default)]
    pub dimension: Option<usize>,

    #[serde(default = "default_embedding_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_embedding_provider() -> String {
    "voyageai".to_string()
}

fn default_embedding_model() -> String {
    "voyage-context-3".to_string()
}

fn default_embedding_base_url() -> String {
    "https://api.voyageai.com/v1".to_string()
}

fn default_embedding_api_key_env() -> String {
    "VOYAGEAI_API_KEY".to_string()
}

const fn default_embedding_timeout_secs() -> u64 {
    60
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            base_url: default_embedding_base_url(),
            api_key_env: default_embedding_api_key_env(),
            dimension: None,
            timeout_secs: default_embedding_timeout_secs(),
        }
    }
}

/// Vector database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VectorDbConfig {
    /// `qdrant` or `memory`
    #[serde(default = "default_vector_provider")]
    pub provider: String,

    #[serde(default = "default_vector_url")]
    pub url: String,

    /// Optional; the key is only sent when the variable is set
    #[serde(default = "default_vector_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_vector_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_collection_name")]
    pub collection_name: String,

    /// Points per upsert request during ingestion
    #[serde(default = "default_upsert_batch_size")]
    pub upsert_batch_size: usize,
}

fn default_vector_provider() -> String {
    "qdrant".to_string()
}

fn default_vector_url() -> String {
    "http://localhost:6333".to_string()
}

fn default_vector_api_key_env() -> String {
    "QDRANT_API_KEY".to_string()
}

const fn default_vector_timeout_secs() -> u64 {
    10
}

fn default_collection_name() -> String {
    "documents".to_string()
}

const fn default_upsert_batch_size() -> usize {
    100
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            provider: default_vector_provider(),
            url: default_vector_url(),
            api_key_env: default_vector_api_key_env(),
            timeout_secs: default_vector_timeout_secs(),
            collection_name: default_collection_name(),
            upsert_batch_size: default_upsert_batch_size(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 disables retries)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    500
}

const fn default_max_backoff_ms() -> u64 {
    10_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    #[serde(default = "default_log_file_name")]
    pub file_name: String,

    /// daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_log_file_name() -> String {
    "docchat.log".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            file_name: default_log_file_name(),
            rotation: default_rotation(),
        }
    }
}
