//! URL classification and short-link resolution.
//!
//! Classification must succeed before any retrieval strategy runs; anything
//! that cannot be pinned to a platform after resolution is an
//! [`ScrapeError::UnsupportedUrl`].

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use url::Url;

use crosscart_core::{AppConfig, Platform};

use crate::error::ScrapeError;
use crate::parse::product_url_in_text;

/// Hosts that are link shorteners rather than product pages. Includes each
/// platform's own regional short domains plus the generic shorteners people
/// paste from chat apps.
const SHORT_HOSTS: &[&str] = &[
    "amzn.in",
    "amzn.to",
    "amzn.eu",
    "a.co",
    "fkrt.cc",
    "fkrt.it",
    "fkrt.to",
    "dl.flipkart.com",
    "bit.ly",
    "t.co",
    "ow.ly",
    "goo.gl",
    "tinyurl.com",
];

/// Query params some shorteners use to carry the real destination.
const REDIRECT_PARAMS: &[&str] = &["url", "u", "redirect", "redirect_url", "target"];

static ASIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(?:dp|gp/product)/([A-Z0-9]{10})").expect("valid regex"));
static FLIPKART_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/p/(itm[0-9A-Za-z]+)").expect("valid regex"));
static AMAZON_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/([^/]+)/dp/").expect("valid regex"));
static FLIPKART_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/([^/]+)/p/").expect("valid regex"));
static SEPARATOR_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_]+").expect("valid regex"));

const RESOLVE_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// A raw URL resolved and classified against a platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUrl {
    pub platform: Platform,
    pub canonical_url: String,
    pub product_id: Option<String>,
}

/// Classifies a URL by domain substring. Short-link hosts deliberately do
/// not classify; they must be resolved first.
#[must_use]
pub fn classify(url: &str) -> Option<Platform> {
    let host = host_of(url)?;
    if is_short_host(&host) {
        return None;
    }
    if host.contains("amazon.in") || host.contains("amazon.com") {
        return Some(Platform::Amazon);
    }
    if host.contains("flipkart.com") {
        return Some(Platform::Flipkart);
    }
    None
}

/// Whether the URL's host is a known link shortener.
#[must_use]
pub fn is_short_link(url: &str) -> bool {
    host_of(url).is_some_and(|host| is_short_host(&host))
}

/// Extracts the platform-specific product identifier, when present:
/// an Amazon ASIN or a Flipkart `pid`/item slug.
#[must_use]
pub fn product_id(platform: Platform, url: &str) -> Option<String> {
    match platform {
        Platform::Amazon => ASIN_RE
            .captures(url)
            .map(|c| c[1].to_owned()),
        Platform::Flipkart => {
            if let Ok(parsed) = Url::parse(url) {
                if let Some((_, pid)) = parsed.query_pairs().find(|(k, _)| k == "pid") {
                    if !pid.is_empty() {
                        return Some(pid.into_owned());
                    }
                }
            }
            FLIPKART_SLUG_RE.captures(url).map(|c| c[1].to_owned())
        }
    }
}

/// Derives a human-readable product name from the URL slug. Used as the
/// last-resort title when page extraction comes up empty.
#[must_use]
pub fn name_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let path = percent_encoding::percent_decode_str(parsed.path())
        .decode_utf8()
        .ok()?
        .into_owned();
    let host = parsed.host_str().unwrap_or_default();

    let slug = if host.contains("amazon") {
        AMAZON_NAME_RE.captures(&path).map(|c| c[1].to_owned())
    } else if host.contains("flipkart") {
        FLIPKART_NAME_RE.captures(&path).map(|c| c[1].to_owned())
    } else {
        None
    };
    let slug = slug.or_else(|| {
        path.split('/')
            .filter(|segment| segment.contains('-') && segment.len() > 10)
            .max_by_key(|segment| segment.len())
            .map(ToOwned::to_owned)
    })?;

    let name = SEPARATOR_RUN_RE.replace_all(&slug, " ").trim().to_owned();
    (!name.is_empty()).then_some(name)
}

/// Resolves short links and classifies raw URLs into [`NormalizedUrl`]s.
pub struct Normalizer {
    client: Client,
    max_hops: usize,
}

impl Normalizer {
    /// Builds a resolver whose redirect hops are followed manually so the
    /// hop budget is explicit.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying client cannot be built.
    pub fn new(timeout_secs: u64, max_hops: usize) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(RESOLVE_USER_AGENT)
            .build()?;
        Ok(Self { client, max_hops })
    }

    /// # Errors
    ///
    /// Same as [`Normalizer::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ScrapeError> {
        Self::new(config.resolve_timeout_secs, config.resolve_max_hops)
    }

    /// Classifies `raw_url`, resolving short links first.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::UnsupportedUrl`] when the URL cannot be parsed,
    /// cannot be resolved within the hop budget, or resolves to a domain
    /// that is neither platform.
    pub async fn normalize(&self, raw_url: &str) -> Result<NormalizedUrl, ScrapeError> {
        let raw = raw_url.trim();
        let url = ensure_scheme(raw).ok_or_else(|| ScrapeError::UnsupportedUrl {
            url: raw.to_owned(),
            reason: "not a valid URL".to_owned(),
        })?;

        if let Some(platform) = classify(&url) {
            return Ok(build(platform, url));
        }

        let resolved =
            self.resolve(&url)
                .await
                .ok_or_else(|| ScrapeError::UnsupportedUrl {
                    url: raw.to_owned(),
                    reason: "short link did not resolve to a supported storefront".to_owned(),
                })?;
        let platform = classify(&resolved).ok_or_else(|| ScrapeError::UnsupportedUrl {
            url: raw.to_owned(),
            reason: "resolved URL is not a supported storefront".to_owned(),
        })?;
        tracing::debug!(raw = raw, resolved = %resolved, "short link resolved");
        Ok(build(platform, resolved))
    }

    /// Resolves a short link to a classifiable product URL.
    ///
    /// Three escalating steps, cheapest first: an embedded-destination query
    /// param (no network), bounded `Location` hops, then a scan of the final
    /// body for a product URL hidden in markup or scripts.
    async fn resolve(&self, url: &str) -> Option<String> {
        if let Some(embedded) = embedded_destination(url) {
            return Some(embedded);
        }

        let mut current = url.to_owned();
        for hop in 0..self.max_hops {
            let response = match self.client.get(&current).send().await {
                Ok(response) => response,
                Err(error) => {
                    tracing::debug!(url = %current, hop, error = %error, "resolve hop failed");
                    return None;
                }
            };

            if response.status().is_redirection() {
                let location = response
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|v| v.to_str().ok())?;
                let next = Url::parse(&current).ok()?.join(location).ok()?.to_string();
                if classify(&next).is_some() {
                    return Some(next);
                }
                current = next;
                continue;
            }

            // Terminal response: the destination may be buried in the body
            // (meta refresh, og:url, JS blobs).
            let body = response.text().await.ok()?;
            return product_url_in_text(&body).filter(|c| classify(c).is_some());
        }

        tracing::debug!(url, max_hops = self.max_hops, "redirect hop budget exhausted");
        None
    }
}

fn build(platform: Platform, canonical_url: String) -> NormalizedUrl {
    let product_id = product_id(platform, &canonical_url);
    NormalizedUrl {
        platform,
        canonical_url,
        product_id,
    }
}

fn ensure_scheme(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    let candidate = if raw.contains("://") {
        raw.to_owned()
    } else {
        format!("https://{raw}")
    };
    Url::parse(&candidate).ok().map(|_| candidate)
}

fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_owned())
}

fn is_short_host(host: &str) -> bool {
    SHORT_HOSTS.contains(&host)
}

/// Checks redirect-style query params for an embedded destination URL.
fn embedded_destination(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    for (key, value) in parsed.query_pairs() {
        if REDIRECT_PARAMS.contains(&key.as_ref()) && !value.is_empty() {
            let candidate = value.into_owned();
            if classify(&candidate).is_some() {
                return Some(candidate);
            }
        }
    }
    None
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
