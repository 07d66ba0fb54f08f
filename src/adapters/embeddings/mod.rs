//! Embedding provider adapters.

pub mod voyage;

pub use voyage::{dimension_for_model, VoyageConfig, VoyageEmbeddingProvider};
