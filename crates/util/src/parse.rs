//! Wire-value parsing helpers.
//!
//! Connector property values always arrive as strings; these helpers give the
//! rest of the workspace one strict, fail-safe interpretation of them.

/// Parse a wire boolean.
///
/// Only the exact string `"true"` is truthy; `"false"`, `"TRUE"`, the empty
/// string, and every other value parse as `false`. Case-sensitive,
/// fail-safe-to-false on purpose: an unexpected value must never switch a
/// policy on.
pub fn parse_boolean(value: &str) -> bool {
    value == "true"
}

/// Parse a wire integer, when the value is a well-formed decimal string.
pub fn parse_integer(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

/// Whether a wire value resolves to numeric zero.
pub fn is_zero(value: &str) -> bool {
    parse_integer(value) == Some(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exact_true_is_truthy() {
        assert!(parse_boolean("true"));
        assert!(!parse_boolean("false"));
        assert!(!parse_boolean("TRUE"));
        assert!(!parse_boolean("True"));
        assert!(!parse_boolean(""));
        assert!(!parse_boolean("1"));
    }

    #[test]
    fn integer_parsing_tolerates_surrounding_whitespace() {
        assert_eq!(parse_integer(" 30 "), Some(30));
        assert_eq!(parse_integer("-1"), Some(-1));
        assert_eq!(parse_integer("ten"), None);
        assert_eq!(parse_integer(""), None);
    }

    #[test]
    fn zero_detection_uses_numeric_value() {
        assert!(is_zero("0"));
        assert!(is_zero(" 0"));
        assert!(!is_zero("00x"));
        assert!(!is_zero("30"));
        assert!(!is_zero(""));
    }
}
