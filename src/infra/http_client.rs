use crate::app::ports::PageFetcher;
use crate::config::FetcherConfig;
use crate::error::{EnrichError, FetchError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, LOCATION};
use reqwest::redirect::{Attempt, Policy};
use reqwest::{Response, Url};
use tracing::{debug, instrument};

/// `PageFetcher` backed by a shared reqwest client.
///
/// Any 3xx carrying a `Location` is followed (relative targets resolved
/// against the current URL) up to `max_redirects` hops. reqwest's policy
/// handles 301/302/303/307/308; other 3xx such as 300 are followed here.
/// gzip and deflate bodies are decoded by reqwest; other encodings come
/// through untouched.
pub struct ReqwestFetcher {
    client: reqwest::Client,
    max_redirects: usize,
}

impl ReqwestFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Ok(accept) = HeaderValue::from_str(&config.accept) {
            headers.insert(ACCEPT, accept);
        }
        if let Ok(language) = HeaderValue::from_str(&config.accept_language) {
            headers.insert(ACCEPT_LANGUAGE, language);
        }

        let max_redirects = config.max_redirects;
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.timeout())
            .gzip(true)
            .deflate(true)
            .redirect(Policy::custom(move |attempt| follow_redirect(attempt, max_redirects)))
            .build()
            .map_err(|e| EnrichError::Config(format!("invalid HTTP client settings: {e}")))?;

        Ok(Self {
            client,
            max_redirects,
        })
    }

    fn map_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_redirect() {
            FetchError::TooManyRedirects(self.max_redirects)
        } else if err.is_builder() {
            FetchError::InvalidUrl(err.to_string())
        } else if err.is_connect() {
            FetchError::Connect(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

fn check_scheme(url: &Url) -> std::result::Result<(), FetchError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(FetchError::InvalidUrl(format!("unsupported scheme '{other}'"))),
    }
}

/// Target of a 3xx response reqwest handed back instead of following
fn unfollowed_location(resp: &Response) -> Option<Url> {
    if !resp.status().is_redirection() {
        return None;
    }
    let location = resp.headers().get(LOCATION)?.to_str().ok()?;
    resp.url().join(location.trim()).ok()
}

fn follow_redirect(attempt: Attempt<'_>, max_redirects: usize) -> reqwest::redirect::Action {
    if attempt.previous().len() > max_redirects {
        attempt.error(format!("exceeded {max_redirects} redirects"))
    } else {
        debug!(status = attempt.status().as_u16(), to = %attempt.url(), "Following redirect");
        attempt.follow()
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        let mut target = Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        let mut hops = 0;

        loop {
            check_scheme(&target)?;
            let resp = self
                .client
                .get(target.clone())
                .send()
                .await
                .map_err(|e| self.map_error(e))?;

            if let Some(next) = unfollowed_location(&resp) {
                hops += 1;
                if hops > self.max_redirects {
                    return Err(FetchError::TooManyRedirects(self.max_redirects));
                }
                debug!(status = resp.status().as_u16(), to = %next, "Following redirect");
                target = next;
                continue;
            }

            let status = resp.status();
            if !status.is_success() {
                debug!(status = status.as_u16(), "Non-success response");
                return Err(FetchError::Status(status.as_u16()));
            }

            let final_url = resp.url().to_string();
            let body = resp.text().await.map_err(|e| self.map_error(e))?;
            debug!(final_url = %final_url, bytes = body.len(), "Fetched page");
            return Ok(body);
        }
    }
}
