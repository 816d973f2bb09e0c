use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use super::base::{
    clean_text, find_json_ld, has_truthy, has_type, image_url, into_remote, number_field,
    scale_field,
};
use crate::app::ports::PageFetcher;
use crate::constants::{DEFAULT_RATING_SCALE, REVIEW_SITE_SUMMARY_CHARS};
use crate::types::{Platform, PlatformAdapter, RemoteMetadata, ScrapedMetadata};

/// Games review outlet. A review page describes itself as a `Review` (or the
/// reviewed `Game`) in JSON-LD; the critic's score is the rating.
pub struct ReviewSiteAdapter {
    fetcher: Arc<dyn PageFetcher>,
}

fn is_review_block(value: &Value) -> bool {
    has_type(value, "Review") || has_truthy(value, "reviewRating") || has_type(value, "Game")
}

impl ReviewSiteAdapter {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    pub fn extract(html: &str) -> ScrapedMetadata {
        let mut meta = ScrapedMetadata::empty(Platform::ReviewSite);
        let Some(json) = find_json_ld(html, is_review_block) else {
            return meta;
        };

        if let Some(review_rating) = json.get("reviewRating").filter(|v| !v.is_null()) {
            meta.rating = number_field(review_rating.get("ratingValue"));
            meta.scale = scale_field(review_rating.get("bestRating"), DEFAULT_RATING_SCALE);
        }

        meta.summary = match (text_field(&json, "description"), text_field(&json, "reviewBody")) {
            (Some(description), _) => Some(clean_text(description)),
            (None, Some(body)) => Some(
                clean_text(body)
                    .chars()
                    .take(REVIEW_SITE_SUMMARY_CHARS)
                    .collect(),
            ),
            (None, None) => None,
        };

        meta.cover_image = image_url(json.get("image"))
            .or_else(|| json.get("itemReviewed").and_then(|item| image_url(item.get("image"))));
        meta
    }
}

fn text_field<'a>(json: &'a Value, field: &str) -> Option<&'a str> {
    json.get(field).and_then(Value::as_str).filter(|s| !s.is_empty())
}

#[async_trait::async_trait]
impl PlatformAdapter for ReviewSiteAdapter {
    fn platform(&self) -> Platform {
        Platform::ReviewSite
    }

    #[instrument(skip(self))]
    async fn scrape(&self, url: &str) -> RemoteMetadata {
        let result = self.fetcher.fetch(url).await.map(|html| Self::extract(&html));
        into_remote(Platform::ReviewSite, url, result)
    }
}
