//! System health reporting.

use serde::{Deserialize, Serialize};

use super::search::CollectionInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Aggregate health of the chat system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_db: Option<CollectionInfo>,
    pub llm_model: String,
    pub embedding_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SystemStatus {
    pub fn healthy(vector_db: CollectionInfo, llm_model: String, embedding_model: String) -> Self {
        Self {
            status: HealthStatus::Healthy,
            vector_db: Some(vector_db),
            llm_model,
            embedding_model,
            error: None,
        }
    }

    pub fn degraded(error: String, llm_model: String, embedding_model: String) -> Self {
        Self {
            status: HealthStatus::Degraded,
            vector_db: None,
            llm_model,
            embedding_model,
            error: Some(error),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}
