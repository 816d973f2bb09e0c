use futures::future::join_all;
use tracing::{info, instrument};

use crate::pipeline::enrich::Enricher;
use crate::types::{Catalog, EnrichedCatalog};

impl Enricher {
    /// Enriches every entry of every category concurrently.
    ///
    /// Categories and entries come back in input order regardless of which
    /// scrape finishes first.
    #[instrument(skip_all, fields(categories = catalog.len()))]
    pub async fn enrich_all(&self, catalog: Catalog) -> EnrichedCatalog {
        let total: usize = catalog.values().map(Vec::len).sum();

        let categories = catalog.into_iter().map(|(category, entries)| async move {
            let enriched = join_all(entries.into_iter().map(|entry| self.enrich(entry))).await;
            (category, enriched)
        });
        let enriched: EnrichedCatalog = join_all(categories).await.into_iter().collect();

        info!(entries = total, "Catalog enriched");
        enriched
    }
}
