use std::sync::Arc;

use tracing::info;

use crate::app::ports::CatalogSource;
use crate::error::Result;
use crate::pipeline::enrich::Enricher;
use crate::types::EnrichedCatalog;

/// Read path for "get all media": load the catalog fresh, enrich it.
pub struct MediaService {
    source: Arc<dyn CatalogSource>,
    enricher: Enricher,
}

impl MediaService {
    pub fn new(source: Arc<dyn CatalogSource>, enricher: Enricher) -> Self {
        Self { source, enricher }
    }

    pub async fn get_all_media(&self) -> Result<EnrichedCatalog> {
        let catalog = self.source.load().await?;
        Ok(self.enricher.enrich_all(catalog).await)
    }

    /// Drops every cached scrape. Any write to the catalog must call this,
    /// since changed links would otherwise keep serving stale remote data.
    pub async fn invalidate(&self) {
        self.enricher.cache().clear().await;
        info!("Remote metadata cache invalidated");
    }
}
