//! Document loader adapters.

pub mod extract;
pub mod file;

pub use file::{FileDocumentLoader, MAX_FILE_SIZE, SUPPORTED_EXTENSIONS};
