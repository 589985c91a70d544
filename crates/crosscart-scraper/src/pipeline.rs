//! The full analysis pass: resolve the submitted link, pull the source
//! listing, locate the counterpart on the other marketplace, and compare.
//!
//! Only the source-platform steps are fatal. A failed counterpart search
//! still produces a response, with the missing side marked not found.

use serde::Serialize;
use tracing::{info, warn};

use crosscart_core::{compare, AppConfig, ComparisonResult, Platform, ProductRecord};

use crate::error::ScrapeError;
use crate::extract::extract_product;
use crate::fetch::{Fetch, Fetcher};
use crate::normalize::{self, Normalizer};
use crate::search::{search_platform, SearchEndpoints};

/// Successful analysis payload. `analyzed_at` is stamped by the caller that
/// serializes this for the wire.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub success: bool,
    pub product_name: String,
    pub source_platform: Platform,
    pub source_url: String,
    pub resolved_url: String,
    pub amazon: ProductRecord,
    pub flipkart: ProductRecord,
    pub comparison: ComparisonResult,
}

/// Orchestrates one analysis end to end. Generic over the retrieval engine
/// so the pipeline is testable with canned pages.
pub struct Analyzer<F: Fetch> {
    fetcher: F,
    normalizer: Normalizer,
    endpoints: SearchEndpoints,
}

impl Analyzer<Fetcher> {
    /// Builds the production analyzer from application config.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if an HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScrapeError> {
        Ok(Self::new(
            Fetcher::from_config(config)?,
            Normalizer::from_config(config)?,
        ))
    }
}

impl<F: Fetch> Analyzer<F> {
    pub fn new(fetcher: F, normalizer: Normalizer) -> Self {
        Self {
            fetcher,
            normalizer,
            endpoints: SearchEndpoints::default(),
        }
    }

    /// Overrides the marketplace search endpoints, for tests.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: SearchEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Runs the whole pipeline for one submitted URL.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::UnsupportedUrl`] for links that resolve to
    /// neither marketplace, and the retrieval/extraction errors of the
    /// source-platform steps. Counterpart-search failures are not errors.
    pub async fn analyze(&self, raw_url: &str) -> Result<AnalysisResponse, ScrapeError> {
        let normalized = self.normalizer.normalize(raw_url).await?;
        let platform = normalized.platform;
        let url = normalized.canonical_url;
        info!(%platform, %url, "analyzing product page");

        let body = self.fetcher.fetch(&url).await.into_body(&url)?;

        let mut source = extract_product(platform, &body, &url);
        if !source.found {
            // Bot walls sometimes serve a stripped shell page. The URL slug
            // still names the product even when the DOM gives nothing.
            match normalize::name_from_url(&url) {
                Some(name) => {
                    warn!(%platform, "extraction came up empty, using URL slug");
                    source = ProductRecord::found(
                        platform,
                        name,
                        url.clone(),
                        None,
                        None,
                        "Price could not be verified",
                    );
                }
                None => return Err(ScrapeError::ExtractionFailed { platform }),
            }
        }

        let title = source.title.clone().unwrap_or_default();
        let counterpart =
            search_platform(&self.fetcher, &self.endpoints, &title, platform.other()).await;

        let (amazon, flipkart) = match platform {
            Platform::Amazon => (source, counterpart),
            Platform::Flipkart => (counterpart, source),
        };
        let comparison = compare(&amazon, &flipkart);
        info!(
            cheapest = ?comparison.cheapest_platform,
            savings = ?comparison.price_difference,
            "analysis complete"
        );

        Ok(AnalysisResponse {
            success: true,
            product_name: title,
            source_platform: platform,
            source_url: raw_url.trim().to_owned(),
            resolved_url: url,
            amazon,
            flipkart,
            comparison,
        })
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
