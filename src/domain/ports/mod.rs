//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that adapters must implement:
//! - LanguageModel: chat completions
//! - EmbeddingProvider: text to vectors
//! - VectorStore: collections, upserts and similarity search
//! - DocumentLoader: source files to text fragments
//!
//! These traits keep the services independent of any specific provider.

pub mod document_loader;
pub mod embedding;
pub mod language_model;
pub mod vector_store;

pub use document_loader::DocumentLoader;
pub use embedding::{EmbeddingBatch, EmbeddingProvider, InputType};
pub use language_model::{Generation, GenerationParams, LanguageModel};
pub use vector_store::VectorStore;
