use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::instrument;

use super::base::{clean_text, decode_entities, into_remote};
use crate::app::ports::PageFetcher;
use crate::constants::{AGGREGATOR_HOT_COMMENT_LIMIT, DEFAULT_RATING_SCALE};
use crate::types::{HotComment, Platform, PlatformAdapter, RemoteMetadata, ScrapedMetadata};

static RATING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<strong class="rating_num"[^>]*>([\d.]+)</strong>"#).expect("valid regex")
});
static VOTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<span property="v:votes">([\d,]+)</span>"#).expect("valid regex"));
static COVER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta\s+property="og:image"\s+content="([^"]+)""#).expect("valid regex")
});
static COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"<div class="comment-item"[\s\S]*?data-cid="\d+""#,
        r#"[\s\S]*?<span class="votes vote-count">(\d+)</span>"#,
        r#"[\s\S]*?<a href="[^"]+"[^>]*>([^<]+)</a>"#,
        r#"[\s\S]*?<span class="short">([\s\S]*?)</span>"#,
    ))
    .expect("valid regex")
});

/// Review/rating aggregator. Its subject pages carry no structured data, so
/// everything is matched straight out of the markup.
pub struct AggregatorAdapter {
    fetcher: Arc<dyn PageFetcher>,
}

impl AggregatorAdapter {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Extracts rating, vote count, cover and the first hot comments from a subject page
    pub fn extract(html: &str) -> ScrapedMetadata {
        let rating = RATING
            .captures(html)
            .and_then(|c| c[1].parse::<f64>().ok());
        let votes = VOTES
            .captures(html)
            .and_then(|c| c[1].replace(',', "").parse::<u64>().ok());
        let cover_image = COVER.captures(html).map(|c| c[1].to_string());

        // first N in page order; the page's own ordering is kept as-is
        let hot_comments = COMMENT
            .captures_iter(html)
            .take(AGGREGATOR_HOT_COMMENT_LIMIT)
            .map(|c| HotComment {
                author: Some(decode_entities(c[2].trim())),
                votes: c[1].parse().ok(),
                content: clean_text(&c[3]),
            })
            .collect();

        ScrapedMetadata {
            source: Platform::Aggregator,
            rating,
            scale: DEFAULT_RATING_SCALE,
            votes,
            hot_comments,
            summary: None,
            cover_image,
        }
    }
}

#[async_trait::async_trait]
impl PlatformAdapter for AggregatorAdapter {
    fn platform(&self) -> Platform {
        Platform::Aggregator
    }

    #[instrument(skip(self))]
    async fn scrape(&self, url: &str) -> RemoteMetadata {
        let result = self.fetcher.fetch(url).await.map(|html| Self::extract(&html));
        into_remote(Platform::Aggregator, url, result)
    }
}
