//! Domain errors for the docchat system.

use thiserror::Error;

/// Failures raised by an external collaborator (language model, embedding
/// API, vector store).
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} request timed out after {seconds}s")]
    Timeout { provider: String, seconds: u64 },

    #[error("{provider} request failed: {message}")]
    Transport { provider: String, message: String },

    #[error("{provider} API error: {status} - {body}")]
    Api {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("{provider} returned an invalid response: {message}")]
    InvalidResponse { provider: String, message: String },
}

impl ProviderError {
    /// Returns true if the failure is worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport { .. } => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidResponse { .. } => false,
        }
    }

    /// Returns true if the collaborator reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// Name of the collaborator that failed.
    pub fn provider(&self) -> &str {
        match self {
            Self::Timeout { provider, .. }
            | Self::Transport { provider, .. }
            | Self::Api { provider, .. }
            | Self::InvalidResponse { provider, .. } => provider,
        }
    }

    /// Classify a reqwest failure for the given provider.
    pub fn from_reqwest(provider: &str, timeout_secs: u64, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                provider: provider.to_string(),
                seconds: timeout_secs,
            }
        } else if err.is_decode() {
            Self::InvalidResponse {
                provider: provider.to_string(),
                message: err.to_string(),
            }
        } else {
            Self::Transport {
                provider: provider.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// Domain-level errors that can occur in the docchat system.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Failed to process document {path}: {reason}")]
    DocumentProcessing { path: String, reason: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DomainError {
    /// Build a document processing failure for `path`.
    pub fn document(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::DocumentProcessing {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Provider(e) if e.is_not_found())
    }

    /// Attribute this error to the document at `path`.
    ///
    /// Document processing failures pass through untouched so messages are
    /// never nested twice.
    #[must_use]
    pub fn in_document(self, path: &str) -> Self {
        match self {
            Self::DocumentProcessing { .. } => self,
            other => Self::document(path, other),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}
