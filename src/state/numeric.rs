/// Loose numeric extraction for listing fields
///
/// MLS exports are full of values like "3 br", "$450000" or "2.5 baths".
/// Filters only care about the first number in the cell, so this module
/// pulls out the first contiguous digit run (with an optional fractional
/// part) and ignores everything around it.
use once_cell::sync::Lazy;
use regex::Regex;

/// First integer-or-decimal run. Thousands separators are not special:
/// "1,200" yields 1.
static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(\.\d+)?").expect("Invalid NUMBER_RE regex"));

/// Extract the first number from a raw field value.
///
/// Returns `None` for empty input or input without any digits.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    NUMBER_RE
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_number("3"), Some(3.0));
        assert_eq!(parse_number("2.5"), Some(2.5));
        assert_eq!(parse_number("  42  "), Some(42.0));
    }

    #[test]
    fn test_surrounding_text() {
        assert_eq!(parse_number("3 bds"), Some(3.0));
        assert_eq!(parse_number("3 br"), Some(3.0));
        assert_eq!(parse_number("$450000"), Some(450000.0));
        assert_eq!(parse_number("approx. 1850.75 sqft"), Some(1850.75));
    }

    #[test]
    fn test_first_run_wins() {
        // Commas end the run
        assert_eq!(parse_number("1,200"), Some(1.0));
        assert_eq!(parse_number("2 beds 3 baths"), Some(2.0));
        // Only one decimal point is consumed
        assert_eq!(parse_number("1.2.3"), Some(1.2));
        // A trailing dot without digits is not part of the number
        assert_eq!(parse_number("7."), Some(7.0));
    }

    #[test]
    fn test_no_value() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("N/A"), None);
        assert_eq!(parse_number("none listed"), None);
    }
}
