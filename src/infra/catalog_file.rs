use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::app::ports::CatalogSource;
use crate::constants::{PERSONAL_RATING_MAX, PERSONAL_RATING_MIN};
use crate::error::{Result, EnrichError};
use crate::types::Catalog;

/// Catalog stored as a `{ "<category>": [entry, ...] }` JSON file
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parses catalog JSON and normalizes it: links are trimmed with blanks
    /// dropped, and personal ratings outside 0-10 are discarded.
    pub fn parse(content: &str) -> Result<Catalog> {
        let mut catalog: Catalog = serde_json::from_str(content)?;

        for (category, entries) in catalog.iter_mut() {
            let mut seen = HashSet::new();
            for entry in entries.iter_mut() {
                if entry.id.trim().is_empty() {
                    return Err(EnrichError::Catalog(format!(
                        "entry '{}' in category '{}' has an empty id",
                        entry.title, category
                    )));
                }
                if !seen.insert(entry.id.clone()) {
                    warn!(category = %category, id = %entry.id, "Duplicate entry id in category");
                }

                entry.links = entry.links.sanitized();

                if let Some(rating) = entry.personal_rating {
                    if !rating.is_finite() || !(PERSONAL_RATING_MIN..=PERSONAL_RATING_MAX).contains(&rating) {
                        warn!(
                            category = %category,
                            id = %entry.id,
                            rating,
                            "Personal rating out of range, dropping it"
                        );
                        entry.personal_rating = None;
                    }
                }
            }
        }

        Ok(catalog)
    }
}

#[async_trait]
impl CatalogSource for JsonFileCatalog {
    async fn load(&self) -> Result<Catalog> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            EnrichError::Catalog(format!(
                "Failed to read catalog file '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        let catalog = Self::parse(&content)?;
        info!(
            path = %self.path.display(),
            categories = catalog.len(),
            entries = catalog.values().map(Vec::len).sum::<usize>(),
            "Catalog loaded"
        );
        Ok(catalog)
    }
}
