use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// Normalized representation of a scraped product.
///
/// Two shapes are possible and enforced by the constructors:
/// - found: `title` present, `price`/`image_url` best-effort, `message` absent;
/// - not found: only `platform` and a human-readable `message` are set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub platform: Platform,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub specs: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProductRecord {
    /// Builds a successfully extracted record. The price is dropped unless it
    /// is a finite, non-negative number.
    #[must_use]
    pub fn found(
        platform: Platform,
        title: impl Into<String>,
        url: impl Into<String>,
        price: Option<f64>,
        image_url: Option<String>,
        availability: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            found: true,
            title: Some(title.into()),
            price: price.filter(|p| p.is_finite() && *p >= 0.0),
            image_url,
            url: Some(url.into()),
            availability: Some(availability.into()),
            specs: BTreeMap::new(),
            message: None,
        }
    }

    /// Builds the degraded record used when a platform yields nothing.
    #[must_use]
    pub fn not_found(platform: Platform, message: impl Into<String>) -> Self {
        Self {
            platform,
            found: false,
            title: None,
            price: None,
            image_url: None,
            url: None,
            availability: None,
            specs: BTreeMap::new(),
            message: Some(message.into()),
        }
    }

    /// The price this record contributes to a comparison, if any.
    #[must_use]
    pub fn effective_price(&self) -> Option<f64> {
        if self.found {
            self.price
        } else {
            None
        }
    }
}

/// Outcome of comparing two [`ProductRecord`]s.
///
/// `cheapest_platform` is set iff at least one record has a price;
/// `price_difference` and `both_found` require both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub both_found: bool,
    pub cheapest_platform: Option<Platform>,
    pub cheapest_price: Option<f64>,
    pub price_difference: Option<f64>,
    pub savings_platform: Option<Platform>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_record_carries_only_platform_and_message() {
        let record = ProductRecord::not_found(Platform::Flipkart, "Product not found on Flipkart");
        assert!(!record.found);
        assert!(record.title.is_none());
        assert!(record.price.is_none());
        assert!(record.url.is_none());
        assert_eq!(
            record.message.as_deref(),
            Some("Product not found on Flipkart")
        );

        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["found"], false);
        assert!(json.get("title").is_none());
        assert!(json.get("price").is_none());
    }

    #[test]
    fn found_record_rejects_non_finite_price() {
        let record = ProductRecord::found(
            Platform::Amazon,
            "Widget",
            "https://www.amazon.in/dp/B0TEST0001",
            Some(f64::NAN),
            None,
            "In Stock",
        );
        assert!(record.price.is_none());
    }

    #[test]
    fn found_record_rejects_negative_price() {
        let record = ProductRecord::found(
            Platform::Amazon,
            "Widget",
            "https://www.amazon.in/dp/B0TEST0001",
            Some(-499.0),
            None,
            "In Stock",
        );
        assert!(record.price.is_none());
    }

    #[test]
    fn effective_price_is_none_for_not_found() {
        let mut record = ProductRecord::not_found(Platform::Amazon, "nope");
        record.price = Some(100.0);
        assert!(record.effective_price().is_none());
    }
}
