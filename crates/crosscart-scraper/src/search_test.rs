use super::*;
use crate::fetch::{RetrievalResult, StrategyKind};

struct StubFetch {
    body: Option<&'static str>,
}

impl Fetch for StubFetch {
    async fn fetch(&self, _url: &str) -> RetrievalResult {
        match self.body {
            Some(body) => RetrievalResult::ok(body.to_owned(), StrategyKind::Browser),
            None => RetrievalResult::failed(FetchStatus::Blocked, Some(StrategyKind::Proxy)),
        }
    }
}

struct PanicFetch;

impl Fetch for PanicFetch {
    async fn fetch(&self, url: &str) -> RetrievalResult {
        panic!("unexpected fetch of {url}");
    }
}

const FLIPKART_SEARCH_PAGE: &str = r#"<html><body>
<a href="/sony-wh-1000xm5/p/itmf000000000001?pid=ACCG000000000001">
  <div class="KzDlHZ">Sony WH-1000XM5 Wireless Headphones</div>
  <div class="Nx9bqj">₹26,990</div>
</a>
</body></html>"#;

#[test]
fn url_for_percent_encodes_the_title() {
    let endpoints = SearchEndpoints::default();
    let url = endpoints.url_for(Platform::Amazon, "Samsung Galaxy S23 (Green)");
    assert_eq!(
        url,
        "https://www.amazon.in/s?k=Samsung%20Galaxy%20S23%20%28Green%29"
    );
}

#[test]
fn url_for_respects_injected_endpoints() {
    let endpoints = SearchEndpoints {
        amazon: "http://127.0.0.1:9999/amazon?k=".to_owned(),
        flipkart: "http://127.0.0.1:9999/flipkart?q=".to_owned(),
    };
    let url = endpoints.url_for(Platform::Flipkart, "widget");
    assert_eq!(url, "http://127.0.0.1:9999/flipkart?q=widget");
}

#[tokio::test]
async fn first_listing_is_returned_on_a_hit() {
    let fetcher = StubFetch {
        body: Some(FLIPKART_SEARCH_PAGE),
    };
    let record = search_platform(
        &fetcher,
        &SearchEndpoints::default(),
        "Sony WH-1000XM5",
        Platform::Flipkart,
    )
    .await;

    assert!(record.found);
    assert_eq!(
        record.title.as_deref(),
        Some("Sony WH-1000XM5 Wireless Headphones")
    );
    assert_eq!(record.price, Some(26_990.0));
}

#[tokio::test]
async fn fetch_failure_degrades_to_not_found() {
    let fetcher = StubFetch { body: None };
    let record = search_platform(
        &fetcher,
        &SearchEndpoints::default(),
        "Sony WH-1000XM5",
        Platform::Amazon,
    )
    .await;

    assert!(!record.found);
    assert_eq!(record.message.as_deref(), Some("Product not found on Amazon"));
}

#[tokio::test]
async fn empty_page_degrades_to_not_found() {
    let fetcher = StubFetch {
        body: Some("<html><body>No results found</body></html>"),
    };
    let record = search_platform(
        &fetcher,
        &SearchEndpoints::default(),
        "Sony WH-1000XM5",
        Platform::Flipkart,
    )
    .await;

    assert!(!record.found);
    assert_eq!(
        record.message.as_deref(),
        Some("Product not found on Flipkart")
    );
}

#[tokio::test]
async fn blank_title_short_circuits_without_fetching() {
    let record = search_platform(
        &PanicFetch,
        &SearchEndpoints::default(),
        "   ",
        Platform::Amazon,
    )
    .await;
    assert!(!record.found);
}
