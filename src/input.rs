//! Keystroke sanitizing and field validation.

use crate::error::ValidationError;
use crate::purchase::Field;

/// Normalize raw keystroke text for a numeric field without parsing it.
///
/// Keeps digits and the first dot, drops everything else and prefixes a
/// leading dot with `0`. Whitespace-only input clears the field. Trailing
/// dots and zeros are kept so `"10."` survives while the user types.
pub fn sanitize(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let mut cleaned = String::with_capacity(raw.len() + 1);
    let mut seen_dot = false;
    for c in raw.chars() {
        if c.is_ascii_digit() {
            cleaned.push(c);
        } else if c == '.' && !seen_dot {
            seen_dot = true;
            cleaned.push(c);
        }
    }

    if cleaned.starts_with('.') {
        cleaned.insert(0, '0');
    }
    cleaned
}

/// Coerce field text to a number: empty is zero, unparsable is NaN.
pub fn parse_numeric(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Check one field. Valid means a finite number that is not negative.
pub fn validate(field: Field, text: &str) -> Result<f64, ValidationError> {
    let value = parse_numeric(text);
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::NotNonNegative(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_examples() {
        assert_eq!(sanitize("1.2.3"), "1.23");
        assert_eq!(sanitize(".5"), "0.5");
        assert_eq!(sanitize("ab12c.3"), "12.3");
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   "), "");
        assert_eq!(sanitize("10."), "10.");
        assert_eq!(sanitize("1.500"), "1.500");
        assert_eq!(sanitize("-3"), "3");
        assert_eq!(sanitize(" 4 2 "), "42");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for raw in ["1.2.3", ".5", "ab12c.3", "", "  ", "..", "0..1", "$1,000.50", "x"] {
            let once = sanitize(raw);
            assert_eq!(sanitize(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn test_parse_numeric() {
        assert_eq!(parse_numeric(""), 0.0);
        assert_eq!(parse_numeric("1."), 1.0);
        assert_eq!(parse_numeric("0.5"), 0.5);
        assert!(parse_numeric("-").is_nan());
    }

    #[test]
    fn test_validate_examples() {
        assert_eq!(validate(Field::Units, ""), Ok(0.0));
        assert_eq!(validate(Field::Price, "3.5"), Ok(3.5));
        let err = validate(Field::Units, "-1").unwrap_err();
        assert_eq!(err.to_string(), "Units must be a non-negative number");
        assert_eq!(err, ValidationError::NotNonNegative(Field::Units));
        assert!(validate(Field::Price, "abc").is_err());
        assert!(validate(Field::Price, "inf").is_err());
    }
}
