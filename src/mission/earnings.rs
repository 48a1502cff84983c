//! Operator earnings computation
//!
//! Mirrors the platform's payout rule: a flat base rate scaled by package
//! size and weight, both read out of the free-form package description.

/// Flat payout per completed delivery before multipliers
const BASE_RATE: f64 = 10.0;

/// Assumed weight when the description carries no `<number>kg` token
const DEFAULT_WEIGHT_KG: f64 = 2.0;

/// Compute the payout for a completed mission from its package description
pub fn compute_earnings(package_details: Option<&str>) -> f64 {
    let details = package_details.unwrap_or("");
    BASE_RATE * size_multiplier(details) * weight_multiplier(details)
}

fn size_multiplier(details: &str) -> f64 {
    if details.contains("large") {
        2.0
    } else if details.contains("small") {
        1.0
    } else {
        1.5
    }
}

fn weight_multiplier(details: &str) -> f64 {
    let weight = parse_weight_kg(details).unwrap_or(DEFAULT_WEIGHT_KG);
    (weight / 2.0).max(1.0)
}

/// Find the first `<number>kg` token, e.g. "3kg" or "2.5kg"
fn parse_weight_kg(details: &str) -> Option<f64> {
    let bytes = details.as_bytes();
    for (index, _) in details.match_indices("kg") {
        let mut start = index;
        while start > 0 && (bytes[start - 1].is_ascii_digit() || bytes[start - 1] == b'.') {
            start -= 1;
        }

        let token = &details[start..index];
        if token.is_empty() {
            continue;
        }
        if let Ok(weight) = token.parse::<f64>() {
            return Some(weight);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_large_heavy_package() {
        // size 2.0, weight 3kg -> max(1.0, 1.5) = 1.5
        assert_eq!(compute_earnings(Some("3kg large box")), 30.0);
    }

    #[test]
    fn test_small_package_floors_weight_multiplier() {
        // size 1.0, weight 0.5kg -> multiplier floored at 1.0
        assert_eq!(compute_earnings(Some("0.5kg small envelope")), 10.0);
    }

    #[test]
    fn test_unsized_package_defaults() {
        // size 1.5, no weight token -> default 2kg -> multiplier 1.0
        assert_eq!(compute_earnings(Some("standard parcel")), 15.0);
        assert_eq!(compute_earnings(None), 15.0);
    }

    #[test]
    fn test_heavy_crate() {
        // size 1.5, 10kg -> multiplier 5.0
        assert_eq!(compute_earnings(Some("10kg crate")), 75.0);
    }

    #[test]
    fn test_kg_without_digits_falls_back_to_default() {
        // "kg" preceded by no number is not a weight token
        assert_eq!(compute_earnings(Some("some kg of stuff")), 15.0);
    }

    #[test]
    fn test_fractional_weight() {
        // size 2.0, 2.5kg -> multiplier 1.25
        assert_eq!(compute_earnings(Some("large 2.5kg parcel")), 25.0);
    }

    #[test]
    fn test_parse_weight_token() {
        assert_eq!(parse_weight_kg("3kg large box"), Some(3.0));
        assert_eq!(parse_weight_kg("box 2.5kg"), Some(2.5));
        assert_eq!(parse_weight_kg("no weight here"), None);
        assert_eq!(parse_weight_kg("kg"), None);
    }
}
