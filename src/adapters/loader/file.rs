//! File-backed document loader.
//!
//! Plain text and Markdown are read directly; PDF and Word documents go
//! through [`super::extract`]. Extracted text is split on blank lines into
//! paragraph fragments. In Markdown files, paragraphs starting with `#` are
//! marked as title elements so the title chunking strategy can split
//! sections on them.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::Path;
use tracing::{error, info};

use super::extract::{extract_docx, extract_pdf, ExtractError};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Fragment, Metadata};
use crate::domain::ports::DocumentLoader;

/// Largest file accepted, in bytes.
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Lowercased extensions, with the leading dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".txt", ".md", ".pdf", ".docx", ".doc"];

#[derive(Debug, Clone, Copy, Default)]
pub struct FileDocumentLoader;

impl FileDocumentLoader {
    pub fn new() -> Self {
        Self
    }
}

/// Lowercased extension of `path` with its leading dot, or an empty string.
pub fn file_type(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

fn fail(path: &Path, reason: impl Into<String>) -> DomainError {
    let err = DomainError::DocumentProcessing {
        path: path.display().to_string(),
        reason: reason.into(),
    };
    error!(error = %err, "document load failed");
    err
}

/// Split extracted content into paragraph fragments, each carrying a copy
/// of `metadata`.
fn split_paragraphs(content: &str, metadata: &Metadata, mark_titles: bool) -> Vec<Fragment> {
    let normalized = content.replace("\r\n", "\n");
    normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|para| {
            let fragment = Fragment::new(para).with_metadata(metadata.clone());
            if mark_titles && para.starts_with('#') {
                fragment.as_title()
            } else {
                fragment
            }
        })
        .collect()
}

fn base_metadata(path: &Path, suffix: &str, method: &str) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("source".to_string(), Value::String(path.display().to_string()));
    metadata.insert("file_type".to_string(), Value::String(suffix.to_string()));
    metadata.insert("method".to_string(), Value::String(method.to_string()));
    metadata
}

#[async_trait]
impl DocumentLoader for FileDocumentLoader {
    async fn load(&self, path: &Path) -> DomainResult<Vec<Fragment>> {
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|_| fail(path, format!("File not found: {}", path.display())))?;

        if meta.len() > MAX_FILE_SIZE {
            return Err(fail(
                path,
                format!(
                    "File too large: {:.1}MB. Max allowed size: {}MB",
                    meta.len() as f64 / (1024.0 * 1024.0),
                    MAX_FILE_SIZE / (1024 * 1024)
                ),
            ));
        }

        let suffix = file_type(path);
        if !SUPPORTED_EXTENSIONS.contains(&suffix.as_str()) {
            return Err(fail(
                path,
                format!(
                    "Unsupported file type: {suffix}. Supported types: {}",
                    SUPPORTED_EXTENSIONS.join(", ")
                ),
            ));
        }

        info!("Loading document ({suffix}): {}", path.display());
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| fail(path, e.to_string()))?;

        match suffix.as_str() {
            ".pdf" => {
                let pdf = tokio::task::spawn_blocking(move || extract_pdf(&bytes))
                    .await
                    .unwrap_or_else(|e| Err(ExtractError::Pdf(e.to_string())))
                    .map_err(|e| fail(path, e.to_string()))?;
                let mut metadata = base_metadata(path, &suffix, "pdf_extract");
                metadata.insert("pages".to_string(), json!(pdf.pages));
                Ok(split_paragraphs(&pdf.text, &metadata, false))
            }
            ".docx" | ".doc" => {
                let text = tokio::task::spawn_blocking(move || extract_docx(&bytes))
                    .await
                    .unwrap_or_else(|e| Err(ExtractError::Word(e.to_string())))
                    .map_err(|e| fail(path, e.to_string()))?;
                let metadata = base_metadata(path, &suffix, "docx_xml");
                Ok(split_paragraphs(&text, &metadata, false))
            }
            _ => {
                let content = String::from_utf8_lossy(&bytes);
                let metadata = base_metadata(path, &suffix, "native_text");
                Ok(split_paragraphs(&content, &metadata, suffix == ".md"))
            }
        }
    }
}
