use crosscart_core::Platform;
use thiserror::Error;

/// Failure taxonomy for the extraction pipeline.
///
/// `Display` strings double as the user-facing error messages the server
/// returns, so they are written for end users rather than operators.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Could not identify platform for \"{url}\": {reason}. Please paste a direct Amazon.in or Flipkart.com product URL.")]
    UnsupportedUrl { url: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("The product page could not be fetched: every retrieval strategy was blocked.")]
    Blocked { url: String },

    #[error("A network failure prevented fetching the product page. Please try again.")]
    NetworkFailure { url: String },

    #[error("The product page does not exist (404): {url}")]
    NotFound { url: String },

    #[error("Could not extract product details from the {} page. Please try a full product URL, not a short link.", platform.display_name())]
    ExtractionFailed { platform: Platform },
}
