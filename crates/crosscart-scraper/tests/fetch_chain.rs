//! Integration tests for the `Fetcher` strategy chain.
//!
//! Uses `wiremock` to stand up a local HTTP server per test so no real
//! network traffic is made. Browser and plain attempts are told apart by
//! the `Sec-Fetch-Mode` header, which only the browser profile sends.

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crosscart_scraper::{Fetch, FetchStatus, Fetcher, StrategyKind};

/// Builds a `Fetcher` with short timeouts and no proxy credential.
fn test_fetcher() -> Fetcher {
    Fetcher::new(5, 2, None, "https://api.scraperapi.com/").expect("failed to build test Fetcher")
}

/// Builds a `Fetcher` whose proxy strategy points at the mock server.
fn test_fetcher_with_proxy(api_key: &str, proxy_base: &str) -> Fetcher {
    Fetcher::new(5, 2, Some(api_key.to_owned()), proxy_base)
        .expect("failed to build test Fetcher")
}

/// A body big enough to pass the thin-page gate, with no challenge markers.
fn product_page() -> String {
    format!(
        "<html><body><span id=\"productTitle\">Widget</span>{}</body></html>",
        "<p>filler</p>".repeat(200)
    )
}

/// A short page that trips the challenge-marker detection.
const CHALLENGE_PAGE: &str =
    "<html><body>Enter the characters you see below to continue</body></html>";

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn browser_strategy_succeeds_on_first_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/product"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page()))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let result = fetcher.fetch(&format!("{}/product", server.uri())).await;

    assert_eq!(result.status, FetchStatus::Ok);
    assert_eq!(result.strategy, Some(StrategyKind::Browser));
    assert!(result.body.is_some_and(|b| b.contains("productTitle")));
}

// ---------------------------------------------------------------------------
// Escalation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn challenge_page_escalates_from_browser_to_plain() {
    let server = MockServer::start().await;

    // The browser profile sends Sec-Fetch-Mode; serve it the challenge.
    Mock::given(method("GET"))
        .and(path("/product"))
        .and(header("Sec-Fetch-Mode", "navigate"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CHALLENGE_PAGE))
        .mount(&server)
        .await;

    // The plain profile does not; serve it the real page.
    Mock::given(method("GET"))
        .and(path("/product"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page()))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let result = fetcher.fetch(&format!("{}/product", server.uri())).await;

    assert_eq!(result.status, FetchStatus::Ok);
    assert_eq!(result.strategy, Some(StrategyKind::Plain));
}

#[tokio::test]
async fn thin_body_escalates_like_a_challenge() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/product"))
        .and(header("Sec-Fetch-Mode", "navigate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/product"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page()))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let result = fetcher.fetch(&format!("{}/product", server.uri())).await;

    assert_eq!(result.status, FetchStatus::Ok);
    assert_eq!(result.strategy, Some(StrategyKind::Plain));
}

// ---------------------------------------------------------------------------
// Proxy strategy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn proxy_is_skipped_without_a_credential() {
    let server = MockServer::start().await;

    // Every direct attempt gets the challenge page.
    Mock::given(method("GET"))
        .and(path("/product"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CHALLENGE_PAGE))
        .mount(&server)
        .await;

    // Nothing may reach the proxy endpoint.
    Mock::given(method("GET"))
        .and(path("/proxy"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page()))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(5, 2, None, &format!("{}/proxy", server.uri()))
        .expect("failed to build test Fetcher");
    let result = fetcher.fetch(&format!("{}/product", server.uri())).await;

    assert_eq!(result.status, FetchStatus::Blocked);
}

#[tokio::test]
async fn proxy_is_used_when_direct_attempts_are_blocked() {
    let server = MockServer::start().await;
    let product_url = format!("{}/product", server.uri());

    Mock::given(method("GET"))
        .and(path("/product"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CHALLENGE_PAGE))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/proxy"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("url", product_url.as_str()))
        .and(query_param("country_code", "in"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page()))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = test_fetcher_with_proxy("test-key", &format!("{}/proxy", server.uri()));
    let result = fetcher.fetch(&product_url).await;

    assert_eq!(result.status, FetchStatus::Ok);
    assert_eq!(result.strategy, Some(StrategyKind::Proxy));
}

// ---------------------------------------------------------------------------
// Terminal failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_is_terminal_and_does_not_escalate() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/product"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let result = fetcher.fetch(&format!("{}/product", server.uri())).await;

    assert_eq!(result.status, FetchStatus::NotFound);
    assert!(result.body.is_none());
}

#[tokio::test]
async fn server_errors_across_all_strategies_report_blocked() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/product"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let result = fetcher.fetch(&format!("{}/product", server.uri())).await;

    assert_eq!(result.status, FetchStatus::Blocked);
}

#[tokio::test]
async fn unreachable_host_reports_network_error() {
    // Port 1 on loopback refuses connections immediately.
    let fetcher = test_fetcher();
    let result = fetcher.fetch("http://127.0.0.1:1/product").await;

    assert_eq!(result.status, FetchStatus::NetworkError);
}
