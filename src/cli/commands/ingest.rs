//! Implementation of the `docchat ingest` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::output::progress::{create_spinner, ProgressBarExt};
use crate::cli::output::table::{format_ingest, IngestRow};
use crate::cli::output::{output, CommandOutput};
use crate::infrastructure::logging::scrub;
use crate::services::ChatService;

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Documents to ingest (.txt, .md, .pdf, .docx)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct IngestedDocument {
    pub path: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_chunks: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IngestOutput {
    pub collection: String,
    pub documents: Vec<IngestedDocument>,
}

impl IngestOutput {
    fn failed(&self) -> usize {
        self.documents.iter().filter(|d| !d.success).count()
    }
}

impl CommandOutput for IngestOutput {
    fn to_human(&self) -> String {
        let rows: Vec<IngestRow<'_>> = self
            .documents
            .iter()
            .map(|d| IngestRow {
                path: &d.path,
                chunks: d.num_chunks,
                tokens: d.total_tokens,
                error: d.error.as_deref(),
            })
            .collect();
        format!(
            "Collection: {}\n{}\n{} ingested, {} failed",
            self.collection,
            format_ingest(&rows),
            self.documents.len() - self.failed(),
            self.failed()
        )
    }
}

pub async fn execute(args: IngestArgs, chat: &ChatService, json_mode: bool) -> Result<()> {
    let mut documents = Vec::with_capacity(args.paths.len());

    for path in &args.paths {
        let display = path.display().to_string();
        let spinner = create_spinner(format!("Ingesting {display}"), json_mode);
        match chat.ingest(path).await {
            Ok(doc) => {
                spinner.finish_success(format!("{display}: {} chunks", doc.num_chunks()));
                documents.push(IngestedDocument {
                    path: display,
                    success: true,
                    num_chunks: Some(doc.num_chunks()),
                    total_tokens: doc.metadata.get("total_tokens").and_then(|v| v.as_u64()),
                    error: None,
                });
            }
            Err(e) => {
                let message = scrub(&e.to_string());
                spinner.finish_error(display.clone());
                documents.push(IngestedDocument {
                    path: display,
                    success: false,
                    num_chunks: None,
                    total_tokens: None,
                    error: Some(message),
                });
            }
        }
    }

    let result = IngestOutput {
        collection: chat.collection().to_string(),
        documents,
    };
    output(&result, json_mode);

    let failed = result.failed();
    if failed > 0 {
        anyhow::bail!("{failed} of {} documents failed to ingest", result.documents.len());
    }
    Ok(())
}
