//! Field-level parsing helpers shared by the extractors.
//!
//! Product pages on both platforms bury the interesting values in locale
//! formatting (`₹1,24,999`), inline script blobs, and half-escaped JSON.
//! Everything here degrades to `None` on ambiguity rather than emitting a
//! malformed value.

use std::sync::LazyLock;

use regex::Regex;

/// Prices below this are assumed to be stray numbers (ratings, counts).
const MIN_PLAUSIBLE_PRICE: f64 = 10.0;
/// Prices above this are assumed to be product ids leaking into a price slot.
const MAX_PLAUSIBLE_PRICE: f64 = 10_000_000.0;

static CURRENCY_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[,\u{a0}\u{20b9}$\u{a3}\u{20ac}]").expect("valid regex"));
static CURRENCY_WORDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)INR|MRP|RS\.?|USD").expect("valid regex"));
static PRICE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d{1,2})?").expect("valid regex"));

/// Price patterns found in inline JS/JSON blobs, most specific first.
static SCRIPT_PRICE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(?s)"finalPrice"\s*:\s*\{[^{}]{0,220}?"value"\s*:\s*"?(\d[\d,]*\.?\d*)"?"#,
        r#""finalPrice"\s*:\s*(\d[\d,]*\.?\d*)"#,
        r#"(?s)"sellingPrice"\s*:\s*\{[^{}]{0,220}?"(?:value|amount)"\s*:\s*"?(\d[\d,]*\.?\d*)"?"#,
        r#""priceToPayAmount"\s*:\s*"?(\d[\d,]*\.?\d*)"?"#,
        r#"(?s)"listingPrice"\s*:\s*\{[^{}]{0,220}?"amount"\s*:\s*"?(\d[\d,]*\.?\d*)"?"#,
        r#""buyingPrice"\s*:\s*"?(\d[\d,]*\.?\d*)"?"#,
        r#""DisplayPrice"\s*:\s*"[\u{20b9}\s]*([\d,]+)""#,
        r#""priceAmount"\s*:\s*"?(\d[\d,]*\.?\d*)"?"#,
        r#""price"\s*:\s*"?(\d[\d,]*\.?\d*)"?"#,
        r"(?s)finalPrice.*?(\d{3,7})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid price pattern"))
    .collect()
});

static SCRIPT_IMAGE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#""hiRes"\s*:\s*"(https://[^"]+)""#,
        r#""large"\s*:\s*"(https://[^"]+)""#,
        r#""mainUrl"\s*:\s*"(https://[^"]+)""#,
        r#"data-old-hires="(https://[^"]+)""#,
        r#""imageUrl"\s*:\s*"(https://[^"]+)""#,
        r#""src"\s*:\s*"(https://[^"]+(?:jpg|jpeg|png|webp)[^"]*)""#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid image pattern"))
    .collect()
});

static PRODUCT_URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(?i)https?://(?:www\.)?flipkart\.com/[^\s"'<>]+/p/[^\s"'<>]+"#,
        r#"(?i)https?://(?:www\.)?amazon\.(?:in|com)/[^\s"'<>]+/dp/[^\s"'<>]+"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid product URL pattern"))
    .collect()
});

/// Bot-challenge phrases; only small pages count as blocked, since real
/// product pages can legitimately mention captchas in reviews.
const CHALLENGE_MARKERS: &[&str] = &[
    "robot check",
    "captcha",
    "are you a robot",
    "enter the characters",
    "verify you are human",
];
const CHALLENGE_MAX_LEN: usize = 20_000;

/// Parses a price out of arbitrary display text.
///
/// Strips currency symbols, thousands separators, and currency words, then
/// takes the first plausible 2–7 digit number (optionally with two
/// decimals). Longer digit runs are product ids, not prices, and are
/// skipped whole rather than truncated into a bogus value.
#[must_use]
pub fn parse_price(text: &str) -> Option<f64> {
    let stripped = CURRENCY_CHARS_RE.replace_all(text, "");
    let stripped = CURRENCY_WORDS_RE.replace_all(&stripped, "");
    for token in PRICE_NUMBER_RE.find_iter(stripped.trim()) {
        let digits = token
            .as_str()
            .split('.')
            .next()
            .unwrap_or_default()
            .len();
        if !(2..=7).contains(&digits) {
            continue;
        }
        let Ok(value) = token.as_str().parse::<f64>() else {
            continue;
        };
        if value > MIN_PLAUSIBLE_PRICE && value < MAX_PLAUSIBLE_PRICE {
            return Some(value);
        }
    }
    None
}

/// Finds a price buried in inline JS/JSON, trying patterns most specific
/// first so a stray generic `"price"` field does not shadow the real one.
#[must_use]
pub fn price_from_scripts(html: &str) -> Option<f64> {
    SCRIPT_PRICE_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(html)
            .and_then(|c| c.get(1))
            .and_then(|m| parse_price(m.as_str()))
    })
}

/// Finds a product image URL in inline JS.
#[must_use]
pub fn image_from_scripts(html: &str) -> Option<String> {
    SCRIPT_IMAGE_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(html)
            .and_then(|c| c.get(1))
            .map(|m| unescape_json_url(m.as_str()))
            .and_then(|u| normalize_image_url(&u))
    })
}

/// Extracts a Flipkart price tied to the given `pid`, so a product page that
/// embeds prices for recommended items does not win over the actual listing.
#[must_use]
pub fn flipkart_pid_price(html: &str, pid: &str) -> Option<f64> {
    let pid = regex::escape(pid);
    let patterns = [
        format!(r#"(?s)"pid"\s*:\s*"{pid}".{{0,1800}}?"finalPrice"\s*:\s*(\d{{3,7}})"#),
        format!(r#"(?s)"finalPrice"\s*:\s*(\d{{3,7}}).{{0,1800}}?"pid"\s*:\s*"{pid}""#),
        format!(
            r#"(?s)"pid"\s*:\s*"{pid}".{{0,1800}}?"(?:sellingPrice|specialPrice|mrp)"\s*:\s*(\d{{3,7}})"#
        ),
    ];
    patterns.iter().find_map(|pattern| {
        Regex::new(pattern)
            .ok()?
            .captures(html)
            .and_then(|c| c.get(1))
            .and_then(|m| parse_price(m.as_str()))
    })
}

/// Pulls a direct Amazon/Flipkart product URL out of raw or percent-encoded
/// text. Short-link landing pages often hide the target inside JS blobs.
#[must_use]
pub fn product_url_in_text(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let decoded = percent_encoding::percent_decode_str(text)
        .decode_utf8()
        .map(|c| c.into_owned());
    let variants = [Some(text.to_owned()), decoded.ok()];

    for blob in variants.iter().flatten() {
        for pattern in PRODUCT_URL_PATTERNS.iter() {
            if let Some(found) = pattern.find(blob) {
                let candidate = unescape_json_url(found.as_str().trim_matches(['\'', '"', '<', '>']));
                return Some(candidate);
            }
        }
    }
    None
}

/// Whether a response body is an anti-bot challenge page.
#[must_use]
pub fn looks_blocked(html: &str) -> bool {
    if html.len() >= CHALLENGE_MAX_LEN {
        return false;
    }
    let lower = html.to_lowercase();
    CHALLENGE_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Normalizes an image URL: protocol-relative becomes https, anything that
/// is not http(s) is discarded.
#[must_use]
pub fn normalize_image_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    let url = if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.to_owned()
    };
    url.starts_with("http").then_some(url)
}

fn unescape_json_url(url: &str) -> String {
    url.replace("\\u002F", "/").replace("\\/", "/")
}
