use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

use super::base::{
    clean_text, count_field, find_json_ld, has_truthy, image_url, into_remote, number_field,
    scale_field,
};
use crate::app::ports::PageFetcher;
use crate::constants::{DEFAULT_RATING_SCALE, FILM_DB_REVIEW_SNIPPET_LIMIT};
use crate::error::FetchError;
use crate::types::{HotComment, Platform, PlatformAdapter, RemoteMetadata, ScrapedMetadata};

static REVIEW_BODY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<div class="ipc-html-content-inner-div"[^>]*>([\s\S]*?)</div>"#)
        .expect("valid regex")
});

const REVIEWS_QUERY: &str = "ref_=tt_ov_rt";

/// Film database. Ratings come from the title page's JSON-LD block; a few
/// user review snippets are harvested from the reviews sub-page when it loads.
pub struct FilmDbAdapter {
    fetcher: Arc<dyn PageFetcher>,
}

impl FilmDbAdapter {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Reads rating, scale, vote count and cover from the title page
    pub fn extract(html: &str) -> ScrapedMetadata {
        let mut meta = ScrapedMetadata::empty(Platform::FilmDb);
        let Some(json) = find_json_ld(html, |v| has_truthy(v, "aggregateRating")) else {
            return meta;
        };

        let aggregate = &json["aggregateRating"];
        meta.rating = number_field(aggregate.get("ratingValue"));
        meta.scale = scale_field(aggregate.get("bestRating"), DEFAULT_RATING_SCALE);
        meta.votes = count_field(aggregate.get("ratingCount")).filter(|v| *v > 0);
        meta.cover_image = image_url(json.get("image"));
        meta
    }

    /// Non-empty review texts from the reviews sub-page, first N in page order
    pub fn extract_review_snippets(html: &str) -> Vec<HotComment> {
        REVIEW_BODY
            .captures_iter(html)
            .map(|c| clean_text(&c[1]))
            .filter(|content| !content.is_empty())
            .take(FILM_DB_REVIEW_SNIPPET_LIMIT)
            .map(|content| HotComment {
                author: None,
                votes: None,
                content,
            })
            .collect()
    }

    /// `https://host/title/tt1/` -> `https://host/title/tt1/reviews?ref_=tt_ov_rt`
    pub fn reviews_url(title_url: &str) -> String {
        match reqwest::Url::parse(title_url) {
            Ok(mut url) => {
                let path = url.path().trim_end_matches('/').to_string();
                url.set_path(&format!("{path}/reviews"));
                url.set_query(Some(REVIEWS_QUERY));
                url.set_fragment(None);
                url.to_string()
            }
            Err(_) if title_url.ends_with('/') => format!("{title_url}reviews?{REVIEWS_QUERY}"),
            Err(_) => format!("{title_url}/reviews?{REVIEWS_QUERY}"),
        }
    }

    async fn fetch_review_snippets(&self, title_url: &str) -> Result<Vec<HotComment>, FetchError> {
        let html = self.fetcher.fetch(&Self::reviews_url(title_url)).await?;
        Ok(Self::extract_review_snippets(&html))
    }

    async fn try_scrape(&self, url: &str) -> Result<ScrapedMetadata, FetchError> {
        let html = self.fetcher.fetch(url).await?;
        let mut meta = Self::extract(&html);

        // The reviews page is optional; a failure there leaves the snippets empty.
        meta.hot_comments = self.fetch_review_snippets(url).await.unwrap_or_else(|e| {
            debug!(url, error = %e, "Review snippets unavailable");
            Vec::new()
        });
        Ok(meta)
    }
}

#[async_trait::async_trait]
impl PlatformAdapter for FilmDbAdapter {
    fn platform(&self) -> Platform {
        Platform::FilmDb
    }

    #[instrument(skip(self))]
    async fn scrape(&self, url: &str) -> RemoteMetadata {
        let result = self.try_scrape(url).await;
        into_remote(Platform::FilmDb, url, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_aggregate_rating_from_string_fields() {
        let html = r#"<script type="application/ld+json">
            {"@type":"Movie","name":"Film","image":"https://img.example/poster.jpg",
             "aggregateRating":{"ratingValue":"8.2","bestRating":"10","ratingCount":"500"}}
        </script>"#;
        let meta = FilmDbAdapter::extract(html);
        assert_eq!(meta.rating, Some(8.2));
        assert_eq!(meta.scale, 10.0);
        assert_eq!(meta.votes, Some(500));
        assert_eq!(meta.cover_image.as_deref(), Some("https://img.example/poster.jpg"));
    }

    #[test]
    fn test_without_structured_data_everything_is_null() {
        let meta = FilmDbAdapter::extract("<html><head><title>tt1</title></head></html>");
        assert_eq!(meta, ScrapedMetadata::empty(Platform::FilmDb));
    }

    #[test]
    fn test_review_snippets_skip_empty_and_cap() {
        let html = r#"
            <div class="ipc-html-content-inner-div" role="presentation">   </div>
            <div class="ipc-html-content-inner-div">First &quot;review&quot;<br/>line two</div>
            <div class="ipc-html-content-inner-div">Second</div>
            <div class="ipc-html-content-inner-div">Third</div>
        "#;
        let snippets = FilmDbAdapter::extract_review_snippets(html);
        assert_eq!(snippets.len(), 2);
        assert_eq!(snippets[0].content, "First \"review\" line two");
        assert_eq!(snippets[1].content, "Second");
        assert!(snippets[0].author.is_none());
    }

    #[test]
    fn test_reviews_url() {
        assert_eq!(
            FilmDbAdapter::reviews_url("https://films.example/title/tt1/"),
            "https://films.example/title/tt1/reviews?ref_=tt_ov_rt"
        );
        assert_eq!(
            FilmDbAdapter::reviews_url("https://films.example/title/tt1?ref_=nav"),
            "https://films.example/title/tt1/reviews?ref_=tt_ov_rt"
        );
    }
}
