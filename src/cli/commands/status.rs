//! Implementation of the `docchat status` command.

use anyhow::Result;
use console::style;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::SystemStatus;
use crate::services::ChatService;

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct StatusOutput(pub SystemStatus);

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        let status = &self.0;
        let label = if status.is_healthy() {
            style("healthy").green().bold()
        } else {
            style("degraded").yellow().bold()
        };

        let mut lines = vec![
            format!("Status:          {label}"),
            format!("LLM model:       {}", status.llm_model),
            format!("Embedding model: {}", status.embedding_model),
        ];
        if let Some(info) = &status.vector_db {
            lines.push(format!(
                "Collection:      {} ({} vectors, size {}, {}, {})",
                info.name, info.vectors_count, info.vector_size, info.distance, info.status
            ));
        }
        if let Some(error) = &status.error {
            lines.push(format!("Error:           {error}"));
        }
        lines.join("\n")
    }
}

/// Degraded status is reported, not treated as a failure.
pub async fn execute(chat: &ChatService, json_mode: bool) -> Result<()> {
    output(&StatusOutput(chat.status().await), json_mode);
    Ok(())
}
