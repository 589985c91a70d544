use super::*;
use crate::fetch::{FetchStatus, RetrievalResult, StrategyKind};

/// Routes fetches by URL substring. Unrouted URLs fail as network errors,
/// `None` bodies fail as blocked.
struct RoutedFetch {
    routes: Vec<(&'static str, Option<&'static str>)>,
}

impl Fetch for RoutedFetch {
    async fn fetch(&self, url: &str) -> RetrievalResult {
        for (needle, body) in &self.routes {
            if url.contains(needle) {
                return match body {
                    Some(body) => RetrievalResult::ok((*body).to_owned(), StrategyKind::Browser),
                    None => RetrievalResult::failed(FetchStatus::Blocked, None),
                };
            }
        }
        RetrievalResult::failed(FetchStatus::NetworkError, None)
    }
}

fn analyzer(routes: Vec<(&'static str, Option<&'static str>)>) -> Analyzer<RoutedFetch> {
    Analyzer::new(
        RoutedFetch { routes },
        Normalizer::new(5, 3).expect("resolver client"),
    )
}

const AMAZON_PRODUCT_PAGE: &str = r#"<html><body>
<span id="productTitle">Samsung Galaxy S23 Ultra 5G (Green, 12GB, 256GB Storage)</span>
<span class="a-price priceToPay"><span class="a-offscreen">₹1,24,999</span></span>
</body></html>"#;

const FLIPKART_PRODUCT_PAGE: &str = r#"<html><body>
<span class="VU-ZEz">Sony WH-1000XM5 Wireless Headphones</span>
<div class="Nx9bqj">₹26,990</div>
</body></html>"#;

const FLIPKART_SEARCH_PAGE: &str = r#"<html><body>
<a href="/samsung-galaxy-s23-ultra/p/itm6ac6485515ae4?pid=MOBGTAGPTB3VS24W">
  <div class="KzDlHZ">SAMSUNG Galaxy S23 Ultra (Green, 256 GB)</div>
  <div class="Nx9bqj">₹1,19,999</div>
</a>
</body></html>"#;

#[tokio::test]
async fn amazon_source_with_flipkart_hit_compares_both_sides() {
    let analyzer = analyzer(vec![
        ("/dp/", Some(AMAZON_PRODUCT_PAGE)),
        ("flipkart.com/search", Some(FLIPKART_SEARCH_PAGE)),
    ]);

    let response = analyzer
        .analyze("https://www.amazon.in/Samsung-Galaxy-S23-Ultra/dp/B0C7DPS2Q1")
        .await
        .expect("analysis");

    assert!(response.success);
    assert_eq!(response.source_platform, Platform::Amazon);
    assert_eq!(
        response.product_name,
        "Samsung Galaxy S23 Ultra 5G (Green, 12GB, 256GB Storage)"
    );
    assert!(response.amazon.found);
    assert_eq!(response.amazon.price, Some(124_999.0));
    assert!(response.flipkart.found);
    assert_eq!(response.flipkart.price, Some(119_999.0));

    assert!(response.comparison.both_found);
    assert_eq!(
        response.comparison.cheapest_platform,
        Some(Platform::Flipkart)
    );
    assert_eq!(response.comparison.price_difference, Some(5_000.0));
}

#[tokio::test]
async fn counterpart_search_failure_is_not_fatal() {
    let analyzer = analyzer(vec![
        ("/p/itm", Some(FLIPKART_PRODUCT_PAGE)),
        ("amazon.in/s", None),
    ]);

    let response = analyzer
        .analyze("https://www.flipkart.com/sony-wh-1000xm5/p/itmf0a1b2c3d4e5f6")
        .await
        .expect("analysis");

    assert!(response.success);
    assert_eq!(response.source_platform, Platform::Flipkart);
    assert!(response.flipkart.found);
    assert_eq!(response.flipkart.price, Some(26_990.0));
    assert!(!response.amazon.found);
    assert_eq!(
        response.amazon.message.as_deref(),
        Some("Product not found on Amazon")
    );

    assert!(!response.comparison.both_found);
    assert_eq!(
        response.comparison.cheapest_platform,
        Some(Platform::Flipkart)
    );
}

#[tokio::test]
async fn stripped_page_falls_back_to_url_slug_name() {
    let analyzer = analyzer(vec![("/dp/", Some("<html><body></body></html>"))]);

    let response = analyzer
        .analyze("https://www.amazon.in/Samsung-Galaxy-S23-Ultra/dp/B0C7DPS2Q1")
        .await
        .expect("analysis");

    assert_eq!(response.product_name, "Samsung Galaxy S23 Ultra");
    assert!(response.amazon.found);
    assert!(response.amazon.price.is_none());
    assert_eq!(
        response.amazon.availability.as_deref(),
        Some("Price could not be verified")
    );
    assert!(!response.flipkart.found);
}

#[tokio::test]
async fn slugless_stripped_page_is_an_extraction_failure() {
    let analyzer = analyzer(vec![("/dp/", Some("<html><body></body></html>"))]);

    let err = analyzer
        .analyze("https://www.amazon.in/dp/B0C7DPS2Q1")
        .await
        .expect_err("no slug to fall back on");
    assert!(matches!(
        err,
        ScrapeError::ExtractionFailed {
            platform: Platform::Amazon
        }
    ));
}

#[tokio::test]
async fn blocked_source_fetch_is_fatal() {
    let analyzer = analyzer(vec![("/dp/", None)]);

    let err = analyzer
        .analyze("https://www.amazon.in/Widget/dp/B0C7DPS2Q1")
        .await
        .expect_err("blocked");
    assert!(matches!(err, ScrapeError::Blocked { .. }));
}

#[tokio::test]
async fn garbage_input_is_an_unsupported_url() {
    let analyzer = analyzer(vec![]);
    let err = analyzer.analyze("").await.expect_err("empty input");
    assert!(matches!(err, ScrapeError::UnsupportedUrl { .. }));
}
