/// Platform wire names, used for link keys, `remote` map keys and cache key prefixes
pub const AGGREGATOR_PLATFORM: &str = "aggregator";
pub const FILM_DB_PLATFORM: &str = "filmdb";
pub const REVIEW_SITE_PLATFORM: &str = "reviews";

// Link keys found in older catalog files
pub const AGGREGATOR_LEGACY_KEY: &str = "douban";
pub const FILM_DB_LEGACY_KEY: &str = "imdb";
pub const REVIEW_SITE_LEGACY_KEY: &str = "ign";

// Fetcher defaults
pub const DEFAULT_USER_AGENT: &str = "PersonalHabitatBot/1.0 (+https://example.com)";
pub const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en;q=0.8";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

// Cache defaults
pub const DEFAULT_CACHE_TTL_MS: u64 = 1000 * 60 * 60;

// Logging
pub const DEFAULT_LOG_DIRECTORY: &str = "logs";
pub const DEFAULT_LOG_FILE_NAME: &str = "enricher.log";
pub const DEFAULT_LOG_FILTER: &str = "media_enricher=info,warn";

// Extraction limits
pub const DEFAULT_RATING_SCALE: f64 = 10.0;
pub const AGGREGATOR_HOT_COMMENT_LIMIT: usize = 3;
pub const FILM_DB_REVIEW_SNIPPET_LIMIT: usize = 2;
pub const REVIEW_SITE_SUMMARY_CHARS: usize = 160;

pub const PERSONAL_RATING_MIN: f64 = 0.0;
pub const PERSONAL_RATING_MAX: f64 = 10.0;
