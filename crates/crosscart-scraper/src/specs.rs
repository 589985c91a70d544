//! Technical-specification extraction from product pages.
//!
//! Spec tables are the messiest part of both storefronts: key/value rows in
//! tables, `dt`/`dd` lists, "Key: Value" bullet items, and JSON-LD
//! `additionalProperty` entries. Everything is collected as raw pairs first
//! and then normalized once, with noise keys and junk values filtered out.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crosscart_core::Platform;

const MAX_ITEMS: usize = 36;
const MAX_KEY_LEN: usize = 80;
const MAX_VALUE_LEN: usize = 260;

/// Keys that duplicate top-level record fields or carry no product
/// information, matched on a lowercased alphanumeric-only form.
const NOISE_KEYS: &[&str] = &[
    "asin",
    "manufacturer",
    "customerreviews",
    "customerrating",
    "reviews",
    "ratings",
    "bestsellersrank",
    "datefirstavailable",
    "sellers",
    "seller",
    "returnpolicy",
    "delivery",
    "offers",
    "warranty",
    "services",
    "producturl",
    "url",
    "image",
    "sku",
    "modelnumber",
    "itemmodelnumber",
];

const JUNK_VALUES: &[&str] = &["na", "n/a", "not available", "none", "-", "--"];

const AMAZON_SPEC_SELECTORS: &[&str] = &[
    "#productDetails_techSpec_section_1",
    "#productDetails_techSpec_section_2",
    "#technicalSpecifications_section_1",
    "#productDetails_detailBullets_sections1",
    "#detailBullets_feature_div",
    "#poExpander table",
    "#productOverview_feature_div table",
    "table.a-normal.a-spacing-micro",
];

const FLIPKART_SPEC_SELECTORS: &[&str] = &[
    "table._0ZhAN9",
    "table._14cfVK",
    "div._3k-BhJ table",
    "div._1UhVsV table",
    "div.X3BRps table",
    "div.GNDEQ- table",
];

static BIDI_MARKS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[\u{200e}\u{200f}\u{202a}-\u{202e}]").expect("valid regex"));
static KEY_NORM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^a-z0-9]+").expect("valid regex"));

/// Extracts the product's key/value specifications.
#[must_use]
pub fn extract(platform: Platform, doc: &Html) -> BTreeMap<String, String> {
    let selectors = match platform {
        Platform::Amazon => AMAZON_SPEC_SELECTORS,
        Platform::Flipkart => FLIPKART_SPEC_SELECTORS,
    };
    let mut pairs = table_pairs(doc, selectors);
    pairs.extend(json_ld_pairs(doc));
    normalize_pairs(pairs)
}

/// Collects raw key/value pairs from table rows, definition lists, and
/// "Key: Value" list items under the given block selectors.
fn table_pairs(doc: &Html, selectors: &[&str]) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let row_selector = Selector::parse("tr").expect("valid selector");
    let cell_selector = Selector::parse("th, td").expect("valid selector");
    let dt_selector = Selector::parse("dt").expect("valid selector");
    let dd_selector = Selector::parse("dd").expect("valid selector");
    let li_selector = Selector::parse("li").expect("valid selector");
    let span_selector = Selector::parse("span").expect("valid selector");

    for raw in selectors {
        let Ok(block_selector) = Selector::parse(raw) else {
            continue;
        };
        for block in doc.select(&block_selector) {
            for row in block.select(&row_selector) {
                let cells: Vec<ElementRef<'_>> = row.select(&cell_selector).collect();
                if cells.len() >= 2 {
                    pairs.push((cell_text(cells[0]), cell_text(cells[cells.len() - 1])));
                }
            }

            let dts: Vec<_> = block.select(&dt_selector).collect();
            let dds: Vec<_> = block.select(&dd_selector).collect();
            for (dt, dd) in dts.into_iter().zip(dds) {
                pairs.push((cell_text(dt), cell_text(dd)));
            }

            for li in block.select(&li_selector) {
                let text = cell_text(li);
                if let Some((key, value)) = text.split_once(':') {
                    pairs.push((key.to_owned(), value.to_owned()));
                    continue;
                }
                let spans: Vec<_> = li.select(&span_selector).collect();
                if spans.len() >= 2 {
                    pairs.push((cell_text(spans[0]), cell_text(spans[spans.len() - 1])));
                }
            }
        }
    }
    pairs
}

fn json_ld_pairs(doc: &Html) -> Vec<(String, String)> {
    let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
        return Vec::new();
    };
    let mut pairs = Vec::new();
    for script in doc.select(&selector) {
        let raw = script.text().collect::<String>();
        if let Ok(data) = serde_json::from_str::<serde_json::Value>(raw.trim()) {
            collect_ld_properties(&data, &mut pairs);
        }
    }
    pairs
}

/// Walks a JSON-LD node collecting `additionalProperty` name/value entries.
fn collect_ld_properties(node: &serde_json::Value, pairs: &mut Vec<(String, String)>) {
    match node {
        serde_json::Value::Object(map) => {
            match map.get("additionalProperty") {
                Some(serde_json::Value::Array(properties)) => {
                    for property in properties {
                        push_ld_property(property, pairs);
                    }
                }
                Some(property @ serde_json::Value::Object(_)) => {
                    push_ld_property(property, pairs);
                }
                _ => {}
            }
            for (key, value) in map {
                if matches!(
                    key.as_str(),
                    "@context" | "@type" | "url" | "image" | "name" | "offers" | "description"
                ) {
                    continue;
                }
                if value.is_object() || value.is_array() {
                    collect_ld_properties(value, pairs);
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                collect_ld_properties(item, pairs);
            }
        }
        _ => {}
    }
}

fn push_ld_property(property: &serde_json::Value, pairs: &mut Vec<(String, String)>) {
    let name = property
        .get("name")
        .or_else(|| property.get("key"))
        .and_then(serde_json::Value::as_str);
    let value = property.get("value").map(|v| match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    });
    if let (Some(name), Some(value)) = (name, value) {
        pairs.push((name.to_owned(), value));
    }
}

/// Cleans, dedupes, filters, and caps the collected pairs.
fn normalize_pairs(pairs: Vec<(String, String)>) -> BTreeMap<String, String> {
    let mut specs = BTreeMap::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (raw_key, raw_value) in pairs {
        if specs.len() >= MAX_ITEMS {
            break;
        }
        let key = clean_text(&raw_key);
        let mut value = clean_text(&raw_value);
        if key.is_empty() || value.is_empty() || key.len() > MAX_KEY_LEN {
            continue;
        }

        let key_norm = KEY_NORM_RE
            .replace_all(&key.to_lowercase(), "")
            .into_owned();
        if key_norm.is_empty() || NOISE_KEYS.contains(&key_norm.as_str()) {
            continue;
        }
        if JUNK_VALUES.contains(&value.to_lowercase().as_str()) {
            continue;
        }
        if !seen.insert(key_norm) {
            continue;
        }

        if value.len() > MAX_VALUE_LEN {
            let mut cut = MAX_VALUE_LEN - 3;
            while !value.is_char_boundary(cut) {
                cut -= 1;
            }
            value.truncate(cut);
            value = format!("{}...", value.trim_end());
        }
        specs.insert(key, value);
    }
    specs
}

fn clean_text(raw: &str) -> String {
    let text = raw.replace('\u{a0}', " ");
    let text = BIDI_MARKS_RE.replace_all(&text, "");
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.trim_matches([':', ' ']).to_owned()
}

fn cell_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "specs_test.rs"]
mod tests;
