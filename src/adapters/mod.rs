//! Infrastructure adapters for external systems.

pub mod embeddings;
pub mod llm;
pub mod loader;
pub mod retry;
pub mod vector;
