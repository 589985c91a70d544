//! Structured field extraction from semi-structured product HTML.
//!
//! Per field, an ordered list of selectors is tried first-non-empty-wins,
//! then script-blob, JSON-LD, and OpenGraph fallbacks. Malformed markup is
//! never fatal: individual rules fail soft, and only a missing title makes
//! the whole extraction come back `found = false`.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crosscart_core::{Platform, ProductRecord};

use crate::normalize;
use crate::parse::{
    flipkart_pid_price, image_from_scripts, normalize_image_url, parse_price, price_from_scripts,
};
use crate::specs;

const AMAZON_TITLE_SELECTORS: &[&str] = &[
    "#productTitle",
    "span#productTitle",
    "h1.a-size-large",
    "#title span",
    "h1 span",
];
const AMAZON_PRICE_SELECTORS: &[&str] = &[
    "span.a-price.priceToPay span.a-offscreen",
    ".priceToPay span.a-offscreen",
    "#corePriceDisplay_desktop_feature_div span.a-offscreen",
    "#corePriceDisplay_desktop_feature_div .a-price-whole",
    ".a-price .a-offscreen",
    "#priceblock_ourprice",
    "#priceblock_dealprice",
    "#priceblock_saleprice",
    ".a-price-whole",
    "span[data-a-color='price'] .a-offscreen",
    "#apex_offerDisplay_desktop span.a-offscreen",
    ".reinventPricePriceToPayMargin span.a-offscreen",
];
const AMAZON_IMAGE_SELECTORS: &[&str] = &[
    "#landingImage",
    "#imgTagWrapperId img",
    "#imgBlkFront",
    "img#main-image",
    "#imageBlock img",
    ".imgTagWrapper img",
];

const FLIPKART_TITLE_SELECTORS: &[&str] = &[
    "span.VU-ZEz",
    "h1.yhB1nd",
    ".B_NuCI",
    "span.B_NuCI",
    "span[class*='VU-ZEz']",
    "div[class*='GNDEQ-'] h1",
    "div.col.col-7-12 h1",
    "h1",
];
const FLIPKART_PRICE_SELECTORS: &[&str] = &[
    "div.Nx9bqj.CxhGGd",
    "div.Nx9bqj",
    "div[class*='Nx9bqj']",
    "._30jeq3._16Jk6d",
    "._30jeq3",
    "div._16Jk6d",
    "[itemprop='price']",
    "div.UOCQB1",
    "div._3tbKJL",
    "div.CEmiEU div.Nx9bqj",
];
const FLIPKART_IMAGE_SELECTORS: &[&str] = &[
    "img.DByuf4",
    "img._396cs4",
    "img._2r_T1I",
    "img._53J4C-",
    "img[src*='rukminim']",
    "img[src*='flixcart']",
    "div._2r_T1I img",
    "div._3kidU img",
];

/// Flipkart search cards nest title/price inside the product anchor; these
/// are the class variants across grid and list layouts.
const FLIPKART_SEARCH_TITLE_SELECTORS: &[&str] = &[
    "div.KzDlHZ",
    "div._4rR01T",
    ".s1Q9rs",
    ".wjcEIp",
    "div._2WkVRV",
];
const FLIPKART_SEARCH_PRICE_SELECTORS: &[&str] = &["div.Nx9bqj", "div._30jeq3"];

/// Extracts a normalized product record from a product-page body.
#[must_use]
pub fn extract_product(platform: Platform, html: &str, url: &str) -> ProductRecord {
    let doc = Html::parse_document(html);

    let (title_selectors, price_selectors, image_selectors) = match platform {
        Platform::Amazon => (
            AMAZON_TITLE_SELECTORS,
            AMAZON_PRICE_SELECTORS,
            AMAZON_IMAGE_SELECTORS,
        ),
        Platform::Flipkart => (
            FLIPKART_TITLE_SELECTORS,
            FLIPKART_PRICE_SELECTORS,
            FLIPKART_IMAGE_SELECTORS,
        ),
    };

    let mut title = first_title(&doc, title_selectors);
    let mut price = first_price(&doc, price_selectors).or_else(|| price_from_scripts(html));
    let mut image = first_image(&doc, image_selectors).or_else(|| image_from_scripts(html));

    // Flipkart pages embed prices for recommended items too; a price tied to
    // the URL's pid outranks a generic blob price that looks implausible.
    if platform == Platform::Flipkart {
        if let Some(pid) = normalize::product_id(platform, url) {
            if let Some(pid_price) = flipkart_pid_price(html, &pid) {
                let implausible = price.is_none_or(|p| p < 1000.0 && pid_price >= 1000.0);
                if implausible {
                    price = Some(pid_price);
                }
            }
        }
    }

    let (ld_title, ld_price, ld_image) = json_ld_fields(&doc);
    let (og_title, og_price, og_image) = open_graph_fields(&doc);
    title = title.or(ld_title).or(og_title);
    price = price.or(ld_price).or(og_price);
    image = image
        .or(ld_image)
        .or(og_image)
        .and_then(|u| normalize_image_url(&u));

    let record_url = match platform {
        // Flipkart short links resolve through interstitials; the page's own
        // canonical link is the trustworthy product URL.
        Platform::Flipkart => canonical_url(&doc, url).unwrap_or_else(|| url.to_owned()),
        Platform::Amazon => url.to_owned(),
    };

    let availability = match platform {
        Platform::Amazon => select_text(&doc, "#availability span")
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "In Stock".to_owned()),
        Platform::Flipkart => "In Stock".to_owned(),
    };

    let Some(title) = title else {
        return ProductRecord::not_found(
            platform,
            format!(
                "Could not extract product details from the {} page",
                platform.display_name()
            ),
        );
    };

    let mut record =
        ProductRecord::found(platform, title, record_url, price, image, availability);
    record.specs = specs::extract(platform, &doc);
    record
}

/// Extracts the first listing from a search-results page.
///
/// Uses a selector set distinct from product pages; returns `None` when the
/// page has no recognizable result card.
#[must_use]
pub fn extract_search_result(platform: Platform, html: &str) -> Option<ProductRecord> {
    let doc = Html::parse_document(html);
    match platform {
        Platform::Amazon => first_amazon_search_hit(&doc),
        Platform::Flipkart => first_flipkart_search_hit(&doc),
    }
}

fn first_amazon_search_hit(doc: &Html) -> Option<ProductRecord> {
    let card_selector = Selector::parse(r#"[data-component-type="s-search-result"]"#).ok()?;
    let link_selector = Selector::parse("h2 a").ok()?;

    for card in doc.select(&card_selector) {
        let Some(link) = card.select(&link_selector).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if href.is_empty() || href.contains("/s?") {
            continue;
        }
        let url = join_url("https://www.amazon.in", href);

        let title = element_text(link)
            .filter(|t| t.len() > 3)
            .or_else(|| select_text_in(card, &["h2 span", "span.a-text-normal"]))?;
        let price = select_text_in(card, &[".a-price .a-offscreen", ".a-price-whole"])
            .and_then(|t| parse_price(&t));
        let image = select_attr_in(card, "img.s-image", "src")
            .and_then(|src| normalize_image_url(&src));

        return Some(ProductRecord::found(
            Platform::Amazon,
            title,
            url,
            price,
            image,
            "Found in search",
        ));
    }
    None
}

fn first_flipkart_search_hit(doc: &Html) -> Option<ProductRecord> {
    let anchor_selector = Selector::parse(r#"a[href*="/p/"]"#).ok()?;

    for anchor in doc.select(&anchor_selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let url = join_url("https://www.flipkart.com", href);

        let title = select_text_in(anchor, FLIPKART_SEARCH_TITLE_SELECTORS)
            .or_else(|| anchor.value().attr("title").map(str::to_owned))
            .or_else(|| element_text(anchor))
            .filter(|t| t.len() > 3);
        let Some(title) = title else {
            continue;
        };

        let price = select_text_in(anchor, FLIPKART_SEARCH_PRICE_SELECTORS)
            .and_then(|t| parse_price(&t));
        let image =
            select_attr_in(anchor, "img", "src").and_then(|src| normalize_image_url(&src));

        return Some(ProductRecord::found(
            Platform::Flipkart,
            title,
            url,
            price,
            image,
            "Found in search",
        ));
    }
    None
}

// ---------------------------------------------------------------------------
// Selector helpers
// ---------------------------------------------------------------------------

fn first_title(doc: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|raw| {
        let selector = Selector::parse(raw).ok()?;
        doc.select(&selector)
            .next()
            .and_then(element_text)
            .filter(|t| t.len() > 3)
    })
}

fn first_price(doc: &Html, selectors: &[&str]) -> Option<f64> {
    selectors.iter().find_map(|raw| {
        let selector = Selector::parse(raw).ok()?;
        let element = doc.select(&selector).next()?;
        let text = element
            .value()
            .attr("content")
            .map(str::to_owned)
            .or_else(|| element_text(element))?;
        parse_price(&text)
    })
}

fn first_image(doc: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|raw| {
        let selector = Selector::parse(raw).ok()?;
        let element = doc.select(&selector).next()?;

        // Amazon hides the hi-res set in a JSON attribute keyed by URL.
        if let Some(dynamic) = element.value().attr("data-a-dynamic-image") {
            if let Ok(serde_json::Value::Object(map)) =
                serde_json::from_str::<serde_json::Value>(dynamic)
            {
                if let Some(first) = map.keys().next() {
                    return normalize_image_url(first);
                }
            }
        }

        ["src", "data-old-hires", "data-src"]
            .iter()
            .find_map(|attr| element.value().attr(attr))
            .map(|src| src.split([',', ' ']).next().unwrap_or(src))
            .and_then(normalize_image_url)
    })
}

fn canonical_url(doc: &Html, base: &str) -> Option<String> {
    let selector = Selector::parse(r#"link[rel="canonical"]"#).ok()?;
    let href = doc.select(&selector).next()?.value().attr("href")?.trim();
    if href.is_empty() {
        return None;
    }
    Some(join_url(base, href))
}

fn select_text(doc: &Html, raw: &str) -> Option<String> {
    let selector = Selector::parse(raw).ok()?;
    doc.select(&selector).next().and_then(element_text)
}

fn select_text_in(scope: ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|raw| {
        let selector = Selector::parse(raw).ok()?;
        scope.select(&selector).next().and_then(element_text)
    })
}

fn select_attr_in(scope: ElementRef<'_>, raw: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(raw).ok()?;
    scope
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::to_owned)
}

fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}

fn join_url(base: &str, href: &str) -> String {
    Url::parse(base)
        .and_then(|b| b.join(href))
        .map_or_else(|_| href.to_owned(), |u| u.to_string())
}

// ---------------------------------------------------------------------------
// JSON-LD and OpenGraph fallbacks
// ---------------------------------------------------------------------------

type MetaFields = (Option<String>, Option<f64>, Option<String>);

fn json_ld_fields(doc: &Html) -> MetaFields {
    let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
        return (None, None, None);
    };

    let mut title = None;
    let mut price = None;
    let mut image = None;

    for script in doc.select(&selector) {
        let raw = script.text().collect::<String>();
        let Ok(data) = serde_json::from_str::<serde_json::Value>(raw.trim()) else {
            continue;
        };
        let items: Vec<&serde_json::Value> = match &data {
            serde_json::Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        for item in items {
            if title.is_none() {
                title = item
                    .get("name")
                    .and_then(serde_json::Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(ToOwned::to_owned);
            }
            if image.is_none() {
                image = match item.get("image") {
                    Some(serde_json::Value::String(s)) => Some(s.clone()),
                    Some(serde_json::Value::Array(list)) => list
                        .first()
                        .and_then(serde_json::Value::as_str)
                        .map(ToOwned::to_owned),
                    _ => None,
                };
            }
            if price.is_none() {
                price = offer_price(item.get("offers"));
            }
        }
    }
    (title, price, image)
}

fn offer_price(offers: Option<&serde_json::Value>) -> Option<f64> {
    let offer = match offers? {
        serde_json::Value::Array(list) => list.first()?,
        single => single,
    };
    let raw = offer.get("price").or_else(|| offer.get("lowPrice"))?;
    match raw {
        serde_json::Value::String(s) => parse_price(s),
        serde_json::Value::Number(n) => n.as_f64().and_then(|v| parse_price(&v.to_string())),
        _ => None,
    }
}

fn open_graph_fields(doc: &Html) -> MetaFields {
    let meta_content = |selector: &str| -> Option<String> {
        let parsed = Selector::parse(selector).ok()?;
        doc.select(&parsed)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
    };

    let title = meta_content(r#"meta[property="og:title"]"#)
        .or_else(|| meta_content(r#"meta[name="twitter:title"]"#));
    let image = meta_content(r#"meta[property="og:image"]"#)
        .or_else(|| meta_content(r#"meta[name="twitter:image"]"#));
    let price =
        meta_content(r#"meta[property="product:price:amount"]"#).and_then(|c| parse_price(&c));
    (title, price, image)
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
