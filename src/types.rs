use crate::constants::*;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The three external sources an entry can link to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "aggregator")]
    Aggregator,
    #[serde(rename = "filmdb")]
    FilmDb,
    #[serde(rename = "reviews")]
    ReviewSite,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Aggregator, Platform::FilmDb, Platform::ReviewSite];

    /// Order in which adapter-supplied covers are considered when an entry has none
    pub const COVER_PRIORITY: [Platform; 3] =
        [Platform::FilmDb, Platform::ReviewSite, Platform::Aggregator];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Aggregator => AGGREGATOR_PLATFORM,
            Platform::FilmDb => FILM_DB_PLATFORM,
            Platform::ReviewSite => REVIEW_SITE_PLATFORM,
        }
    }

    /// Link key older catalogs used for this platform
    pub fn legacy_key(&self) -> &'static str {
        match self {
            Platform::Aggregator => AGGREGATOR_LEGACY_KEY,
            Platform::FilmDb => FILM_DB_LEGACY_KEY,
            Platform::ReviewSite => REVIEW_SITE_LEGACY_KEY,
        }
    }

    /// Cache key for a scrape of `url` on this platform
    pub fn cache_key(&self, url: &str) -> String {
        format!("{}:{}", self.as_str(), url)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            AGGREGATOR_PLATFORM | AGGREGATOR_LEGACY_KEY => Ok(Platform::Aggregator),
            FILM_DB_PLATFORM | FILM_DB_LEGACY_KEY => Ok(Platform::FilmDb),
            REVIEW_SITE_PLATFORM | REVIEW_SITE_LEGACY_KEY => Ok(Platform::ReviewSite),
            other => Err(format!("unknown platform '{other}'")),
        }
    }
}

/// External source links of a catalog entry, at most one per platform
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Links {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filmdb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<String>,
}

/// Reads links leniently: unknown keys and non-string values are ignored, and
/// a non-blank canonical key wins over the legacy one. A malformed `links`
/// value never fails the entry that carries it.
impl<'de> Deserialize<'de> for Links {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        let mut links = Links::default();
        let Value::Object(map) = raw else {
            return Ok(links);
        };
        for platform in Platform::ALL {
            let url = [platform.as_str(), platform.legacy_key()]
                .into_iter()
                .filter_map(|key| map.get(key).and_then(Value::as_str))
                .find(|url| !url.trim().is_empty());
            links.set(platform, url.map(str::to_string));
        }
        Ok(links)
    }
}

impl Links {
    pub fn get(&self, platform: Platform) -> Option<&str> {
        let link = match platform {
            Platform::Aggregator => &self.aggregator,
            Platform::FilmDb => &self.filmdb,
            Platform::ReviewSite => &self.reviews,
        };
        link.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn set(&mut self, platform: Platform, url: Option<String>) {
        let slot = match platform {
            Platform::Aggregator => &mut self.aggregator,
            Platform::FilmDb => &mut self.filmdb,
            Platform::ReviewSite => &mut self.reviews,
        };
        *slot = url;
    }

    /// Linked platforms with their URLs, in `Platform::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (Platform, &str)> + '_ {
        Platform::ALL
            .into_iter()
            .filter_map(move |platform| self.get(platform).map(|url| (platform, url)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Trims every link and drops blank ones
    pub fn sanitized(&self) -> Links {
        let mut links = Links::default();
        for (platform, url) in self.iter() {
            links.set(platform, Some(url.to_string()));
        }
        links
    }
}

/// A media item as stored in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub creators: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_rating: Option<f64>,
    #[serde(default)]
    pub personal_review: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
    /// Fields this crate does not interpret, carried through unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogEntry {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            creators: Vec::new(),
            summary: String::new(),
            personal_rating: None,
            personal_review: String::new(),
            cover_image: None,
            links: Links::default(),
            extra: Map::new(),
        }
    }

    pub fn with_link(mut self, platform: Platform, url: impl Into<String>) -> Self {
        self.links.set(platform, Some(url.into()));
        self
    }

    pub fn with_cover(mut self, cover: impl Into<String>) -> Self {
        self.cover_image = Some(cover.into());
        self
    }

    /// The entry's own cover, if it has a non-blank one
    pub fn own_cover(&self) -> Option<&str> {
        self.cover_image.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// One highlighted comment or review snippet from an external page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotComment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub votes: Option<u64>,
    pub content: String,
}

/// Normalized rating data extracted from one platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedMetadata {
    pub source: Platform,
    pub rating: Option<f64>,
    #[serde(default = "default_scale")]
    pub scale: f64,
    pub votes: Option<u64>,
    #[serde(default)]
    pub hot_comments: Vec<HotComment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub cover_image: Option<String>,
}

fn default_scale() -> f64 {
    DEFAULT_RATING_SCALE
}

impl ScrapedMetadata {
    /// A record with every optional field empty and the default scale
    pub fn empty(source: Platform) -> Self {
        Self {
            source,
            rating: None,
            scale: DEFAULT_RATING_SCALE,
            votes: None,
            hot_comments: Vec::new(),
            summary: None,
            cover_image: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeFailure {
    pub source: Platform,
    pub error: String,
}

/// Result of scraping one platform: either data or an error message, never both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteMetadata {
    Failed(ScrapeFailure),
    Scraped(ScrapedMetadata),
}

impl RemoteMetadata {
    pub fn failed(source: Platform, error: impl fmt::Display) -> Self {
        RemoteMetadata::Failed(ScrapeFailure {
            source,
            error: error.to_string(),
        })
    }

    pub fn source(&self) -> Platform {
        match self {
            RemoteMetadata::Failed(f) => f.source,
            RemoteMetadata::Scraped(m) => m.source,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RemoteMetadata::Failed(f) => Some(&f.error),
            RemoteMetadata::Scraped(_) => None,
        }
    }

    pub fn scraped(&self) -> Option<&ScrapedMetadata> {
        match self {
            RemoteMetadata::Scraped(m) => Some(m),
            RemoteMetadata::Failed(_) => None,
        }
    }

    pub fn cover_image(&self) -> Option<&str> {
        self.scraped()
            .and_then(|m| m.cover_image.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

impl From<ScrapedMetadata> for RemoteMetadata {
    fn from(meta: ScrapedMetadata) -> Self {
        RemoteMetadata::Scraped(meta)
    }
}

/// A catalog entry with its external metadata attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedEntry {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    pub remote: BTreeMap<Platform, RemoteMetadata>,
}

/// Category name to entries, in file order
pub type Catalog = IndexMap<String, Vec<CatalogEntry>>;

pub type EnrichedCatalog = IndexMap<String, Vec<EnrichedEntry>>;

/// Extraction rules for one external platform
#[async_trait::async_trait]
pub trait PlatformAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    /// Fetch and extract `url`. Failures are reported inside the returned record.
    async fn scrape(&self, url: &str) -> RemoteMetadata;
}
