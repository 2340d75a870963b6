use crate::patient::FieldValue;

/// Placeholder tokens the provider uses instead of leaving a field empty.
/// Matched case-insensitively after trimming.
const MISSING_TOKENS: &[&str] = &[
    "",
    "null",
    "undefined",
    "n/a",
    "na",
    "invalid",
    "temp_error",
    "error",
];

/// Interpret a clinical field as a finite number.
///
/// Returns `None` for absent values, non-scalar values, placeholder tokens,
/// partial or unparseable strings and non-finite numbers.
pub fn parse_numeric(value: Option<&FieldValue>) -> Option<f64> {
    match value? {
        FieldValue::Number(n) => n.is_finite().then_some(*n),
        FieldValue::Text(s) => parse_numeric_str(s),
        FieldValue::Other(_) => None,
    }
}

pub fn parse_numeric_str(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if MISSING_TOKENS
        .iter()
        .any(|token| trimmed.eq_ignore_ascii_case(token))
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_pass_through() {
        assert_eq!(parse_numeric(Some(&FieldValue::Number(150.0))), Some(150.0));
        assert_eq!(parse_numeric(Some(&FieldValue::Number(-2.5))), Some(-2.5));
    }

    #[test]
    fn non_finite_numbers_rejected() {
        assert_eq!(parse_numeric(Some(&FieldValue::Number(f64::NAN))), None);
        assert_eq!(parse_numeric(Some(&FieldValue::Number(f64::INFINITY))), None);
    }

    #[test]
    fn strings_are_trimmed_and_parsed() {
        assert_eq!(parse_numeric(Some(&"150".into())), Some(150.0));
        assert_eq!(parse_numeric(Some(&" 98.6 ".into())), Some(98.6));
        assert_eq!(parse_numeric(Some(&"1e2".into())), Some(100.0));
    }

    #[test]
    fn placeholder_tokens_rejected() {
        for token in ["  ", "N/A", "na", "NULL", "undefined", "Invalid", "TEMP_ERROR", "error"] {
            assert_eq!(parse_numeric_str(token), None, "token {token:?}");
        }
    }

    #[test]
    fn garbage_and_partial_strings_rejected() {
        assert_eq!(parse_numeric_str("abc"), None);
        assert_eq!(parse_numeric_str("98.6F"), None);
        assert_eq!(parse_numeric_str("12 34"), None);
        assert_eq!(parse_numeric_str("NaN"), None);
        assert_eq!(parse_numeric_str("inf"), None);
    }

    #[test]
    fn absent_and_other_rejected() {
        assert_eq!(parse_numeric(None), None);
        assert_eq!(parse_numeric(Some(&FieldValue::Other(json!(true)))), None);
        assert_eq!(parse_numeric(Some(&FieldValue::Other(json!([98.6])))), None);
    }
}
