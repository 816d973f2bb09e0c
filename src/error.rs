use thiserror::Error;

/// Failures that stop a command: bad configuration or an unreadable catalog.
/// Per-page scrape problems never surface here; see [`FetchError`].
#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Malformed catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EnrichError>;

/// Transport-level failure of a single page fetch. Never crosses an adapter boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request failed with status {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("too many redirects (limit {0})")]
    TooManyRedirects(usize),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}
