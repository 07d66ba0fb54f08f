//! Domain layer for docchat
//!
//! This module contains core models, the error taxonomy and the port traits
//! implemented by adapters.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{DomainError, DomainResult, ProviderError};
