//! External rating/review enrichment for a personal media catalog.
//!
//! Entries link to an aggregator site, a film database and a games-review
//! outlet. Each link is scraped by a platform adapter, cached for an hour, and
//! merged back into the entry as a `remote` map.

pub mod apis;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod types;

// Layered boundaries for application and infrastructure
pub mod app;
pub mod infra;

pub use app::media_service::MediaService;
pub use error::{EnrichError, FetchError, Result};
pub use pipeline::{Enricher, ResponseCache};
pub use types::{
    Catalog, CatalogEntry, EnrichedCatalog, EnrichedEntry, HotComment, Links, Platform,
    PlatformAdapter, RemoteMetadata, ScrapeFailure, ScrapedMetadata,
};
