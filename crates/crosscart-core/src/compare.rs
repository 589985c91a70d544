use crate::products::{ComparisonResult, ProductRecord};

/// Compares two product records by price.
///
/// - Neither priced: no cheapest designation, `both_found = false`.
/// - Exactly one priced: that platform wins by default, `both_found = false`,
///   no difference.
/// - Both priced: strict numeric comparison; equal prices resolve to Amazon
///   (fixed priority so ties are deterministic); the difference is the
///   absolute gap and `both_found = true`.
#[must_use]
pub fn compare(a: &ProductRecord, b: &ProductRecord) -> ComparisonResult {
    match (a.effective_price(), b.effective_price()) {
        (None, None) => ComparisonResult {
            both_found: false,
            cheapest_platform: None,
            cheapest_price: None,
            price_difference: None,
            savings_platform: None,
        },
        (Some(price), None) => single_priced(a.platform, price),
        (None, Some(price)) => single_priced(b.platform, price),
        (Some(price_a), Some(price_b)) => {
            let (winner, cheapest) = if price_a < price_b {
                (a.platform, price_a)
            } else if price_b < price_a {
                (b.platform, price_b)
            } else if a.platform == crate::Platform::Amazon {
                (a.platform, price_a)
            } else {
                (b.platform, price_b)
            };
            ComparisonResult {
                both_found: true,
                cheapest_platform: Some(winner),
                cheapest_price: Some(cheapest),
                price_difference: Some((price_a - price_b).abs()),
                savings_platform: Some(winner),
            }
        }
    }
}

fn single_priced(platform: crate::Platform, price: f64) -> ComparisonResult {
    ComparisonResult {
        both_found: false,
        cheapest_platform: Some(platform),
        cheapest_price: Some(price),
        price_difference: None,
        savings_platform: Some(platform),
    }
}

#[cfg(test)]
#[path = "compare_test.rs"]
mod tests;
