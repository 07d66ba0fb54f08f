//! docchat - chat with your documents
//!
//! docchat ingests text documents into a vector store and answers questions
//! about them with an agentic retrieval loop around a language model.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors and the ports collaborators implement
//! - **Service Layer** (`services`): chunking, ingestion, retrieval, the agent loop and chat sessions
//! - **Adapters** (`adapters`): HTTP clients for the LLM, embeddings and Qdrant, plus local stores and loaders
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **Application Layer** (`application`): wiring configuration into services
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use docchat::{ConfigLoader, ServiceFactory};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let chat = ServiceFactory::new(ConfigLoader::load()?).chat_service()?;
//!     chat.ingest(std::path::Path::new("notes.md")).await?;
//!     let reply = chat.turn("default", "What do my notes say about Qdrant?", true).await;
//!     println!("{}", reply.content);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::ServiceFactory;
pub use domain::errors::{DomainError, DomainResult, ProviderError};
pub use domain::models::{
    AssistantMessage, Chunk, ChunkingStrategy, Config, ConversationMessage, Document, Fragment,
    SearchResult, SystemStatus,
};
pub use domain::ports::{DocumentLoader, EmbeddingProvider, LanguageModel, VectorStore};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{AgentLoop, ChatService, Chunker, DocumentProcessingService, RetrievalTool};
