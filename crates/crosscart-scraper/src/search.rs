//! Cross-platform product lookup via marketplace search pages.
//!
//! When a product was analyzed from one marketplace, the counterpart listing
//! is located by feeding the extracted title into the other marketplace's
//! search endpoint and taking the first result. Failures here degrade to a
//! not-found record instead of failing the analysis.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use tracing::{debug, info};

use crosscart_core::{Platform, ProductRecord};

use crate::extract::extract_search_result;
use crate::fetch::{Fetch, FetchStatus};

/// Search-page URL prefixes, one per marketplace. Injectable so integration
/// tests can point them at a local mock server.
#[derive(Debug, Clone)]
pub struct SearchEndpoints {
    pub amazon: String,
    pub flipkart: String,
}

impl Default for SearchEndpoints {
    fn default() -> Self {
        Self {
            amazon: "https://www.amazon.in/s?k=".to_owned(),
            flipkart: "https://www.flipkart.com/search?q=".to_owned(),
        }
    }
}

impl SearchEndpoints {
    /// Builds the search URL for a title on the given marketplace.
    #[must_use]
    pub fn url_for(&self, platform: Platform, title: &str) -> String {
        let prefix = match platform {
            Platform::Amazon => &self.amazon,
            Platform::Flipkart => &self.flipkart,
        };
        let query = utf8_percent_encode(title.trim(), NON_ALPHANUMERIC);
        format!("{prefix}{query}")
    }
}

/// Looks a title up on `target` and returns the first listing, or a
/// not-found record when the search fails or yields nothing.
pub async fn search_platform<F: Fetch>(
    fetcher: &F,
    endpoints: &SearchEndpoints,
    title: &str,
    target: Platform,
) -> ProductRecord {
    let not_found = || {
        ProductRecord::not_found(
            target,
            format!("Product not found on {}", target.display_name()),
        )
    };

    let title = title.trim();
    if title.is_empty() {
        return not_found();
    }

    let url = endpoints.url_for(target, title);
    info!(platform = %target, %url, "searching counterpart listing");

    let result = fetcher.fetch(&url).await;
    if result.status != FetchStatus::Ok {
        debug!(platform = %target, status = ?result.status, "search fetch failed");
        return not_found();
    }
    let Some(body) = result.body else {
        return not_found();
    };

    match extract_search_result(target, &body) {
        Some(record) => {
            info!(
                platform = %target,
                title = record.title.as_deref().unwrap_or_default(),
                price = ?record.price,
                "search hit"
            );
            record
        }
        None => {
            debug!(platform = %target, "search page had no usable result");
            not_found()
        }
    }
}

#[cfg(test)]
#[path = "search_test.rs"]
mod tests;
