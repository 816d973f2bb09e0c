use crate::constants::*;
use crate::error::{Result, EnrichError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub timeout_seconds: u64,
    pub max_redirects: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl FetcherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: DEFAULT_CACHE_TTL_MS,
        }
    }
}

/// Where the daily JSON log files go and which filter applies when
/// `RUST_LOG` is unset
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    pub file_name: String,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_LOG_DIRECTORY),
            file_name: DEFAULT_LOG_FILE_NAME.to_string(),
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Loads `config.toml` from the working directory
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Loads the given file, falling back to defaults when it does not exist.
    /// Environment overrides are applied last.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let config_content = fs::read_to_string(path).map_err(|e| {
                EnrichError::Config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            Self::from_toml(&config_content)?
        } else {
            debug!("Config file '{}' not found, using defaults", path.display());
            Config::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(ttl) = env_u64("ENRICHER_CACHE_TTL_MS") {
            self.cache.ttl_ms = ttl;
        }
        if let Some(timeout) = env_u64("ENRICHER_TIMEOUT_SECONDS") {
            self.fetcher.timeout_seconds = timeout;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.fetcher.timeout_seconds == 0 {
            return Err(EnrichError::Config(
                "fetcher.timeout_seconds must be greater than zero".into(),
            ));
        }
        if self.fetcher.user_agent.trim().is_empty() {
            return Err(EnrichError::Config("fetcher.user_agent must not be empty".into()));
        }
        if self.logging.file_name.trim().is_empty() {
            return Err(EnrichError::Config("logging.file_name must not be empty".into()));
        }
        Ok(())
    }
}

fn env_u64(name: &str) -> Option<u64> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}='{}': not a non-negative integer", name, raw);
            None
        }
    }
}
