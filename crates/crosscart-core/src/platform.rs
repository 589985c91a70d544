use serde::{Deserialize, Serialize};

/// The two storefronts a product can be compared between.
///
/// Every platform-specific behavior (domain patterns, selector tables,
/// search templates) hangs off this enum rather than being duplicated
/// per call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Amazon,
    Flipkart,
}

impl Platform {
    /// The opposite storefront, i.e. where the cross-platform search runs.
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Platform::Amazon => Platform::Flipkart,
            Platform::Flipkart => Platform::Amazon,
        }
    }

    /// Human-readable name used in messages like "Product not found on Amazon".
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Amazon => "Amazon",
            Platform::Flipkart => "Flipkart",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Amazon => write!(f, "amazon"),
            Platform::Flipkart => write!(f, "flipkart"),
        }
    }
}
