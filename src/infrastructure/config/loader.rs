use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("llm.model must be set (config file or DOCCHAT_LLM__MODEL)")]
    MissingModel,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Invalid {0}: must be at least 1")]
    ZeroValue(&'static str),

    #[error("Invalid {0}: {1}. Must be between 0.0 and 2.0")]
    InvalidTemperature(&'static str, f32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Unknown {0} provider: {1}")]
    UnknownProvider(&'static str, String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .docchat/config.yaml (project config)
    /// 3. .docchat/local.yaml (local overrides, optional)
    /// 4. Environment variables (DOCCHAT_* prefix, `__` separates sections)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(Path::new("."))
    }

    /// Same as [`ConfigLoader::load`] with the `.docchat` directory looked
    /// up under `root`.
    pub fn load_from_dir(root: &Path) -> Result<Config> {
        let dir = root.join(".docchat");
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed("DOCCHAT_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file. Environment variables still
    /// take precedence over the file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("DOCCHAT_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.llm.model.trim().is_empty() {
            return Err(ConfigError::MissingModel);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        if !["voyageai"].contains(&config.embeddings.provider.as_str()) {
            return Err(ConfigError::UnknownProvider(
                "embeddings",
                config.embeddings.provider.clone(),
            ));
        }

        if !["qdrant", "memory"].contains(&config.vector_db.provider.as_str()) {
            return Err(ConfigError::UnknownProvider(
                "vector_db",
                config.vector_db.provider.clone(),
            ));
        }

        for (name, value) in [
            ("chunking.max_chunk_size", config.chunking.max_chunk_size),
            ("agent.max_rounds", config.agent.max_rounds),
            ("agent.search_limit", config.agent.search_limit),
            ("vector_db.upsert_batch_size", config.vector_db.upsert_batch_size),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroValue(name));
            }
        }

        for (name, value) in [
            ("llm.temperature", config.llm.temperature),
            ("agent.temperature", config.agent.temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(ConfigError::InvalidTemperature(name, value));
            }
        }

        if config.retry.initial_backoff_ms >= config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        Ok(())
    }
}
