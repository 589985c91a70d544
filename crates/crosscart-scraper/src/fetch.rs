//! Multi-strategy page retrieval with escalating fallback.
//!
//! Strategies run in a fixed order and the first success wins. Each attempt
//! is bounded by the configured timeout; a block, challenge page, thin body,
//! or transport failure advances the chain instead of aborting it.

use std::future::Future;
use std::time::Duration;

use rand::seq::IndexedRandom;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;

use crosscart_core::AppConfig;

use crate::error::ScrapeError;
use crate::parse::looks_blocked;

/// Bodies smaller than this are interstitials or error stubs, not product
/// pages.
const MIN_BODY_BYTES: usize = 1024;

const UA_POOL: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:124.0) Gecko/20100101 Firefox/124.0",
];

/// One concrete mechanism for fetching a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Full browser header profile (the cloud-bypass stand-in).
    Browser,
    /// Minimal headers, rotating user agent.
    Plain,
    /// Third-party proxy-fetch service; requires a configured key.
    Proxy,
}

/// Fixed escalation order; never adaptive.
const STRATEGY_ORDER: &[StrategyKind] =
    &[StrategyKind::Browser, StrategyKind::Plain, StrategyKind::Proxy];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    Ok,
    Blocked,
    NotFound,
    NetworkError,
}

/// Terminal outcome of one retrieval call. `Ok` implies a non-empty body.
#[derive(Debug, Clone)]
pub struct RetrievalResult {
    pub status: FetchStatus,
    pub body: Option<String>,
    pub strategy: Option<StrategyKind>,
}

impl RetrievalResult {
    #[must_use]
    pub fn ok(body: String, strategy: StrategyKind) -> Self {
        Self {
            status: FetchStatus::Ok,
            body: Some(body),
            strategy: Some(strategy),
        }
    }

    #[must_use]
    pub fn failed(status: FetchStatus, strategy: Option<StrategyKind>) -> Self {
        Self {
            status,
            body: None,
            strategy,
        }
    }

    /// Converts the result into a body for the fatal (source-platform) path.
    ///
    /// # Errors
    ///
    /// Maps each non-`Ok` status onto the corresponding [`ScrapeError`].
    pub fn into_body(self, url: &str) -> Result<String, ScrapeError> {
        match self.status {
            FetchStatus::Ok => self.body.ok_or_else(|| ScrapeError::Blocked {
                url: url.to_owned(),
            }),
            FetchStatus::Blocked => Err(ScrapeError::Blocked {
                url: url.to_owned(),
            }),
            FetchStatus::NotFound => Err(ScrapeError::NotFound {
                url: url.to_owned(),
            }),
            FetchStatus::NetworkError => Err(ScrapeError::NetworkFailure {
                url: url.to_owned(),
            }),
        }
    }
}

/// Page retrieval contract. The pipeline is generic over this so tests can
/// substitute canned pages for the real strategy chain.
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = RetrievalResult> + Send;
}

/// Production retrieval engine: Browser → Plain → Proxy.
pub struct Fetcher {
    client: Client,
    api_key: Option<String>,
    proxy_base: Option<Url>,
}

impl Fetcher {
    /// Builds the engine. An unparseable proxy base URL disables the proxy
    /// strategy (with a warning) rather than failing startup.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the reqwest client cannot be built.
    pub fn new(
        timeout_secs: u64,
        connect_timeout_secs: u64,
        api_key: Option<String>,
        proxy_base_url: &str,
    ) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .build()?;

        let proxy_base = match Url::parse(proxy_base_url) {
            Ok(base) => Some(base),
            Err(error) => {
                tracing::warn!(proxy_base_url, %error, "invalid proxy base URL; proxy strategy disabled");
                None
            }
        };

        Ok(Self {
            client,
            api_key,
            proxy_base,
        })
    }

    /// # Errors
    ///
    /// Same as [`Fetcher::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ScrapeError> {
        Self::new(
            config.fetch_timeout_secs,
            config.connect_timeout_secs,
            config.scraper_api_key.clone(),
            &config.proxy_base_url,
        )
    }

    fn proxy_available(&self) -> bool {
        self.api_key.is_some() && self.proxy_base.is_some()
    }

    async fn attempt(
        &self,
        strategy: StrategyKind,
        url: &str,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let user_agent = UA_POOL
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(UA_POOL[0]);
        match strategy {
            StrategyKind::Browser => {
                self.client
                    .get(url)
                    .headers(browser_headers())
                    .header(header::USER_AGENT, user_agent)
                    .send()
                    .await
            }
            StrategyKind::Plain => {
                self.client
                    .get(url)
                    .header(header::USER_AGENT, user_agent)
                    .header(header::ACCEPT, "*/*")
                    .send()
                    .await
            }
            StrategyKind::Proxy => {
                // Presence checked by the caller; both unwraps are guarded
                // by `proxy_available`.
                let mut proxy_url = self.proxy_base.clone().unwrap_or_else(|| {
                    Url::parse("https://api.scraperapi.com/").expect("static URL")
                });
                proxy_url
                    .query_pairs_mut()
                    .append_pair("api_key", self.api_key.as_deref().unwrap_or_default())
                    .append_pair("url", url)
                    .append_pair("country_code", "in")
                    .append_pair("device_type", "desktop")
                    .append_pair("keep_headers", "true");
                self.client.get(proxy_url).send().await
            }
        }
    }
}

impl Fetch for Fetcher {
    async fn fetch(&self, url: &str) -> RetrievalResult {
        let mut saw_response = false;
        let mut saw_transport_error = false;

        for &strategy in STRATEGY_ORDER {
            if strategy == StrategyKind::Proxy && !self.proxy_available() {
                tracing::debug!(url, "proxy strategy skipped: no credential configured");
                continue;
            }

            let response = match self.attempt(strategy, url).await {
                Ok(response) => response,
                Err(error) => {
                    tracing::debug!(url, ?strategy, %error, "fetch attempt failed");
                    saw_transport_error = true;
                    continue;
                }
            };
            saw_response = true;

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                tracing::debug!(url, ?strategy, "product page not found");
                return RetrievalResult::failed(FetchStatus::NotFound, Some(strategy));
            }
            if !status.is_success() {
                tracing::debug!(url, ?strategy, status = status.as_u16(), "non-success status");
                continue;
            }

            let body = match response.text().await {
                Ok(body) => body,
                Err(error) => {
                    tracing::debug!(url, ?strategy, %error, "failed reading body");
                    saw_transport_error = true;
                    continue;
                }
            };

            if body.len() >= MIN_BODY_BYTES && !looks_blocked(&body) {
                tracing::debug!(url, ?strategy, bytes = body.len(), "fetch succeeded");
                return RetrievalResult::ok(body, strategy);
            }
            tracing::debug!(url, ?strategy, bytes = body.len(), "blocked or thin body");
        }

        if saw_response || !saw_transport_error {
            RetrievalResult::failed(FetchStatus::Blocked, None)
        } else {
            RetrievalResult::failed(FetchStatus::NetworkError, None)
        }
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-IN,en-GB;q=0.9,en-US;q=0.8,en;q=0.7"),
    );
    headers.insert(
        header::REFERER,
        HeaderValue::from_static("https://www.google.com/"),
    );
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers.insert("Sec-Fetch-Dest", HeaderValue::from_static("document"));
    headers.insert("Sec-Fetch-Mode", HeaderValue::from_static("navigate"));
    headers.insert("Sec-Fetch-Site", HeaderValue::from_static("cross-site"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert("DNT", HeaderValue::from_static("1"));
    headers
}
