use async_trait::async_trait;

use crate::error::{FetchError, Result};
use crate::types::Catalog;

/// Retrieves a page body as text
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError>;
}

/// Read-only source of the media catalog, loaded fresh per enrichment pass
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load(&self) -> Result<Catalog>;
}
