use async_trait::async_trait;
use std::path::Path;

use crate::domain::errors::DomainResult;
use crate::domain::models::Fragment;

/// Reads a source document into raw text fragments.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, path: &Path) -> DomainResult<Vec<Fragment>>;
}
