// Enrichment pipeline: cache, per-entry orchestration, catalog-wide aggregation

pub mod aggregate;
pub mod cache;
pub mod enrich;

pub use cache::{ResponseCache, TtlCache};
pub use enrich::Enricher;
