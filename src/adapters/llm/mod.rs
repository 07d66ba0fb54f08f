//! Language model adapters.

pub mod openrouter;

pub use openrouter::{OpenRouterClient, OpenRouterConfig};
