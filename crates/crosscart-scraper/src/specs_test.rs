use super::*;

fn amazon_doc(inner: &str) -> Html {
    Html::parse_document(&format!(
        "<html><body><table id=\"productDetails_techSpec_section_1\">{inner}</table></body></html>"
    ))
}

#[test]
fn table_rows_become_spec_pairs() {
    let doc = amazon_doc(
        "<tr><th>Screen Size</th><td>6.8 Inches</td></tr>\
         <tr><th>RAM</th><td>12 GB</td></tr>",
    );
    let specs = extract(Platform::Amazon, &doc);
    assert_eq!(specs.get("Screen Size").map(String::as_str), Some("6.8 Inches"));
    assert_eq!(specs.get("RAM").map(String::as_str), Some("12 GB"));
}

#[test]
fn noise_keys_are_filtered() {
    let doc = amazon_doc(
        "<tr><th>ASIN</th><td>B0C7DPS2Q1</td></tr>\
         <tr><th>Item model number</th><td>SM-S918B</td></tr>\
         <tr><th>Battery</th><td>5000 mAh</td></tr>",
    );
    let specs = extract(Platform::Amazon, &doc);
    assert!(!specs.contains_key("ASIN"));
    assert!(!specs.contains_key("Item model number"));
    assert_eq!(specs.get("Battery").map(String::as_str), Some("5000 mAh"));
}

#[test]
fn junk_values_are_filtered() {
    let doc = amazon_doc("<tr><th>Color</th><td>N/A</td></tr>");
    let specs = extract(Platform::Amazon, &doc);
    assert!(specs.is_empty());
}

#[test]
fn duplicate_keys_keep_first_occurrence() {
    let doc = amazon_doc(
        "<tr><th>Battery</th><td>5000 mAh</td></tr>\
         <tr><th>battery</th><td>different</td></tr>",
    );
    let specs = extract(Platform::Amazon, &doc);
    assert_eq!(specs.len(), 1);
    assert_eq!(specs.get("Battery").map(String::as_str), Some("5000 mAh"));
}

#[test]
fn whitespace_and_bidi_marks_are_cleaned() {
    let doc = amazon_doc("<tr><th>\u{200e}Weight :</th><td>  234\u{a0}g </td></tr>");
    let specs = extract(Platform::Amazon, &doc);
    assert_eq!(specs.get("Weight").map(String::as_str), Some("234 g"));
}

#[test]
fn item_cap_is_enforced() {
    let rows: String = (0..50)
        .map(|i| format!("<tr><th>Key number {i}</th><td>value {i}</td></tr>"))
        .collect();
    let doc = amazon_doc(&rows);
    let specs = extract(Platform::Amazon, &doc);
    assert_eq!(specs.len(), 36);
}

#[test]
fn long_values_are_truncated_with_ellipsis() {
    let long_value = "x".repeat(400);
    let doc = amazon_doc(&format!("<tr><th>Notes</th><td>{long_value}</td></tr>"));
    let specs = extract(Platform::Amazon, &doc);
    let value = specs.get("Notes").expect("value present");
    assert!(value.len() <= 260);
    assert!(value.ends_with("..."));
}

#[test]
fn list_items_with_colon_split_into_pairs() {
    let doc = Html::parse_document(
        "<html><body><div id=\"detailBullets_feature_div\"><ul>\
         <li>Operating System: Android 13</li>\
         </ul></div></body></html>",
    );
    let specs = extract(Platform::Amazon, &doc);
    assert_eq!(
        specs.get("Operating System").map(String::as_str),
        Some("Android 13")
    );
}

#[test]
fn flipkart_spec_table_selectors_apply() {
    let doc = Html::parse_document(
        "<html><body><table class=\"_14cfVK\">\
         <tr><td>Display Size</td><td>17.02 cm</td></tr>\
         </table></body></html>",
    );
    let specs = extract(Platform::Flipkart, &doc);
    assert_eq!(
        specs.get("Display Size").map(String::as_str),
        Some("17.02 cm")
    );
}

#[test]
fn json_ld_additional_properties_are_collected() {
    let doc = Html::parse_document(
        r#"<html><head><script type="application/ld+json">
        {"@type":"Product","name":"Phone","additionalProperty":[
            {"name":"Chipset","value":"Snapdragon 8 Gen 2"}
        ]}
        </script></head><body></body></html>"#,
    );
    let specs = extract(Platform::Amazon, &doc);
    assert_eq!(
        specs.get("Chipset").map(String::as_str),
        Some("Snapdragon 8 Gen 2")
    );
}
