//! HTTP page fetching with retry, browser-like headers and courtesy delays.
//!
//! One [`PageFetcher`] (wrapping one reusable `reqwest::Client`) is built at
//! startup and passed to every scraping step.
//!
//! # Retry Strategy
//!
//! - At most 3 attempts per request
//! - Retried only on HTTP 429/500/502/503/504 or connection-level failures
//! - Exponential backoff between attempts: 1s, 2s, 4s, ...
//!
//! # Throttling
//!
//! - A uniform 1-3s pause before every homepage request
//! - A fixed 2s pause between sources

use rand::seq::IndexedRandom;
use rand::{Rng, rng};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// Timeout for homepage requests.
pub const HOMEPAGE_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for article page requests.
pub const ARTICLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Status codes that trigger another attempt.
const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// User-Agent rotation pool; one entry is picked at random per request.
pub const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Edge/91.0.864.59",
];

/// Errors surfaced once a request has definitively failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("failed to read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// The URL the failed request was made to.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Body { url, .. } => url,
        }
    }
}

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct Page {
    pub status: StatusCode,
    /// Final URL after redirects.
    pub url: String,
    pub body: String,
}

/// Transport-level retry settings.
///
/// The delay before retry `n` (1-based) is `base_delay * 2^(n-1)`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    fn delay_for(&self, retry: usize) -> Duration {
        self.base_delay
            .saturating_mul(1u32 << (retry.saturating_sub(1).min(16) as u32))
    }
}

/// Courtesy delays between requests.
#[derive(Debug, Clone)]
pub struct Throttle {
    /// Bounds (inclusive) of the random pause before each homepage request.
    pub homepage_min: Duration,
    pub homepage_max: Duration,
    /// Fixed pause after each source has been processed.
    pub between_sources: Duration,
}

impl Default for Throttle {
    fn default() -> Self {
        Self {
            homepage_min: Duration::from_secs(1),
            homepage_max: Duration::from_secs(3),
            between_sources: Duration::from_secs(2),
        }
    }
}

impl Throttle {
    /// No delays at all.
    pub fn none() -> Self {
        Self {
            homepage_min: Duration::ZERO,
            homepage_max: Duration::ZERO,
            between_sources: Duration::ZERO,
        }
    }

    /// Sleep for a uniformly random duration within the homepage bounds.
    pub async fn before_homepage(&self) {
        let delay = if self.homepage_max > self.homepage_min {
            rng().random_range(self.homepage_min..=self.homepage_max)
        } else {
            self.homepage_min
        };
        debug!(?delay, "Pausing before homepage request");
        sleep(delay).await;
    }

    pub async fn between_sources(&self) {
        sleep(self.between_sources).await;
    }
}

/// Browser-like request headers with a randomly chosen User-Agent.
pub fn browser_headers() -> HeaderMap {
    let user_agent = USER_AGENTS.choose(&mut rng()).copied().unwrap_or(USER_AGENTS[0]);

    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(user_agent));
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
    );
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(header::DNT, HeaderValue::from_static("1"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers
}

/// Issues GET requests through one shared client under a [`RetryPolicy`].
pub struct PageFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl fmt::Debug for PageFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageFetcher")
            .field("policy", &self.policy)
            .finish()
    }
}

impl PageFetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Fetch `url`, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the final attempt fails at the transport
    /// level, ends with a non-2xx status, or its body cannot be read.
    #[instrument(level = "debug", skip(self, headers))]
    pub async fn fetch(
        &self,
        url: &str,
        headers: &HeaderMap,
        timeout: Duration,
    ) -> Result<Page, FetchError> {
        let t0 = Instant::now();
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0usize;

        loop {
            attempt += 1;
            let result = self
                .client
                .get(url)
                .headers(headers.clone())
                .timeout(timeout)
                .send()
                .await;

            let retryable = match &result {
                Ok(response) => RETRY_STATUSES.contains(&response.status().as_u16()),
                Err(e) => e.is_connect() || e.is_timeout(),
            };

            if retryable && attempt < max_attempts {
                let delay = self.policy.delay_for(attempt);
                match &result {
                    Ok(response) => warn!(%url, attempt, status = %response.status(), ?delay, "Retryable status; backing off"),
                    Err(e) => warn!(%url, attempt, error = %e, ?delay, "Connection failure; backing off"),
                }
                sleep(delay).await;
                continue;
            }

            let response = result.map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status,
                });
            }

            let final_url = response.url().to_string();
            let body = response.text().await.map_err(|source| FetchError::Body {
                url: url.to_string(),
                source,
            })?;

            debug!(
                %url,
                attempt,
                bytes = body.len(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Fetched page"
            );
            return Ok(Page {
                status,
                url: final_url,
                body,
            });
        }
    }
}
