use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, instrument, warn};

use crate::apis::factory::create_all_adapters;
use crate::app::ports::PageFetcher;
use crate::pipeline::cache::ResponseCache;
use crate::types::{CatalogEntry, EnrichedEntry, Platform, PlatformAdapter, RemoteMetadata};

/// Attaches external metadata to catalog entries.
///
/// Each linked platform is scraped through the shared cache under
/// `platform:url`. Adapters never fail, so one unreachable platform only
/// shows up as an error record in that platform's slot.
pub struct Enricher {
    adapters: HashMap<Platform, Arc<dyn PlatformAdapter>>,
    cache: Arc<ResponseCache>,
}

impl Enricher {
    pub fn new(adapters: Vec<Arc<dyn PlatformAdapter>>, cache: Arc<ResponseCache>) -> Self {
        let adapters = adapters
            .into_iter()
            .map(|adapter| (adapter.platform(), adapter))
            .collect();
        Self { adapters, cache }
    }

    /// The standard three adapters over one fetcher
    pub fn with_fetcher(fetcher: Arc<dyn PageFetcher>, cache: Arc<ResponseCache>) -> Self {
        Self::new(create_all_adapters(fetcher), cache)
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    #[instrument(skip(self, entry), fields(id = %entry.id))]
    pub async fn enrich(&self, mut entry: CatalogEntry) -> EnrichedEntry {
        let lookups: Vec<_> = entry
            .links
            .iter()
            .filter_map(|(platform, url)| {
                let Some(adapter) = self.adapters.get(&platform).cloned() else {
                    warn!(platform = %platform, "No adapter registered, skipping link");
                    return None;
                };
                let key = platform.cache_key(url);
                let url = url.to_string();
                let cache = &self.cache;
                Some(async move {
                    let meta = cache
                        .get_or_compute(&key, || async { adapter.scrape(&url).await })
                        .await;
                    (platform, meta)
                })
            })
            .collect();

        let remote: BTreeMap<Platform, RemoteMetadata> = join_all(lookups).await.into_iter().collect();

        // `remote` is computed here, never passed through from the stored entry
        entry.extra.remove("remote");

        if entry.own_cover().is_none() {
            if let Some(cover) = resolve_cover(&remote) {
                debug!(cover = %cover, "Filled cover from remote metadata");
                entry.cover_image = Some(cover);
            }
        }

        EnrichedEntry { entry, remote }
    }
}

/// First adapter-supplied cover in `Platform::COVER_PRIORITY` order
pub fn resolve_cover(remote: &BTreeMap<Platform, RemoteMetadata>) -> Option<String> {
    Platform::COVER_PRIORITY
        .iter()
        .find_map(|platform| remote.get(platform).and_then(RemoteMetadata::cover_image))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScrapedMetadata;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed record and counts calls
    struct StubAdapter {
        platform: Platform,
        cover: Option<&'static str>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubAdapter {
        fn new(platform: Platform, cover: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                platform,
                cover,
                fail: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(platform: Platform) -> Arc<Self> {
            Arc::new(Self {
                platform,
                cover: None,
                fail: true,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl PlatformAdapter for StubAdapter {
        fn platform(&self) -> Platform {
            self.platform
        }

        async fn scrape(&self, url: &str) -> RemoteMetadata {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return RemoteMetadata::failed(self.platform, format!("{url} unreachable"));
            }
            let mut meta = ScrapedMetadata::empty(self.platform);
            meta.rating = Some(7.0);
            meta.cover_image = self.cover.map(str::to_string);
            meta.into()
        }
    }

    fn enricher(adapters: Vec<Arc<StubAdapter>>) -> Enricher {
        let adapters = adapters
            .into_iter()
            .map(|a| a as Arc<dyn PlatformAdapter>)
            .collect();
        Enricher::new(adapters, Arc::new(ResponseCache::default()))
    }

    #[tokio::test]
    async fn test_entry_without_links_is_untouched() {
        let enricher = enricher(vec![StubAdapter::new(Platform::FilmDb, Some("https://img/f.jpg"))]);
        let entry = CatalogEntry::new("b1", "Book");

        let enriched = enricher.enrich(entry.clone()).await;
        assert!(enriched.remote.is_empty());
        assert_eq!(enriched.entry, entry);
    }

    #[tokio::test]
    async fn test_cover_priority_prefers_film_db() {
        let enricher = enricher(vec![
            StubAdapter::new(Platform::Aggregator, Some("https://img/agg.jpg")),
            StubAdapter::new(Platform::FilmDb, Some("https://img/film.jpg")),
            StubAdapter::new(Platform::ReviewSite, Some("https://img/review.jpg")),
        ]);
        let entry = CatalogEntry::new("m1", "Film")
            .with_link(Platform::Aggregator, "https://agg/1")
            .with_link(Platform::FilmDb, "https://films/tt1")
            .with_link(Platform::ReviewSite, "https://reviews/1");

        let enriched = enricher.enrich(entry).await;
        assert_eq!(enriched.remote.len(), 3);
        assert_eq!(enriched.entry.cover_image.as_deref(), Some("https://img/film.jpg"));
    }

    #[tokio::test]
    async fn test_own_cover_wins_over_remote() {
        let enricher = enricher(vec![StubAdapter::new(Platform::FilmDb, Some("https://img/film.jpg"))]);
        let entry = CatalogEntry::new("m1", "Film")
            .with_cover("https://mine/cover.jpg")
            .with_link(Platform::FilmDb, "https://films/tt1");

        let enriched = enricher.enrich(entry).await;
        assert_eq!(enriched.entry.cover_image.as_deref(), Some("https://mine/cover.jpg"));
    }

    #[tokio::test]
    async fn test_failed_platform_does_not_affect_others() {
        let enricher = enricher(vec![
            StubAdapter::failing(Platform::Aggregator),
            StubAdapter::new(Platform::ReviewSite, Some("https://img/review.jpg")),
        ]);
        let entry = CatalogEntry::new("g1", "Game")
            .with_link(Platform::Aggregator, "https://agg/9")
            .with_link(Platform::ReviewSite, "https://reviews/9");

        let enriched = enricher.enrich(entry).await;
        assert_eq!(
            enriched.remote[&Platform::Aggregator].error(),
            Some("https://agg/9 unreachable")
        );
        assert!(enriched.remote[&Platform::ReviewSite].error().is_none());
        assert_eq!(enriched.entry.cover_image.as_deref(), Some("https://img/review.jpg"));
    }

    #[tokio::test]
    async fn test_same_link_is_scraped_once_within_ttl() {
        let stub = StubAdapter::new(Platform::FilmDb, None);
        let enricher = enricher(vec![stub.clone()]);
        let entry = CatalogEntry::new("m1", "Film").with_link(Platform::FilmDb, "https://films/tt1");

        enricher.enrich(entry.clone()).await;
        enricher.enrich(entry.clone()).await;
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);

        enricher.cache().clear().await;
        enricher.enrich(entry).await;
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_link_without_adapter_is_skipped() {
        let enricher = enricher(vec![StubAdapter::new(Platform::FilmDb, None)]);
        let entry = CatalogEntry::new("m1", "Film").with_link(Platform::Aggregator, "https://agg/1");

        let enriched = enricher.enrich(entry).await;
        assert!(enriched.remote.is_empty());
    }

    #[tokio::test]
    async fn test_unresolved_cover_is_served_as_null() {
        let enricher = enricher(vec![StubAdapter::failing(Platform::FilmDb)]);
        let entry = CatalogEntry::new("m4", "Film").with_link(Platform::FilmDb, "https://films/tt4");

        let enriched = enricher.enrich(entry).await;
        let value = serde_json::to_value(&enriched).unwrap();

        assert_eq!(value["coverImage"], serde_json::Value::Null);
        assert!(value.as_object().unwrap().contains_key("coverImage"));
        assert_eq!(value["remote"]["filmdb"]["error"], "https://films/tt4 unreachable");
    }
}
