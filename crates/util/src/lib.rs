use once_cell::sync::Lazy;
use regex::Regex;

pub mod parse;
pub mod path_processing;
pub mod properties;

pub use parse::parse_boolean;
pub use path_processing::expand_tilde;
pub use properties::{decode_property_name, encode_property_name};

static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization: )([\w\-\.=:/+]+)",
        r"(?i)([A-Z0-9_]*?(KEY|TOKEN|SECRET|PASSWORD))=([^\s]+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("redaction pattern is valid"))
    .collect()
});

/// Redacts values that look like secrets in a string.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for re in REDACT_PATTERNS.iter() {
        redacted = re
            .replace_all(&redacted, |caps: &regex::Captures| {
                let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{}<redacted>", prefix)
            })
            .to_string();
    }
    redacted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_header_is_redacted() {
        let line = "authorization: Bearer abc123.def456";
        assert_eq!(redact_sensitive(line), "authorization: <redacted>");
    }

    #[test]
    fn env_style_token_is_redacted() {
        let line = "GOVCTL_API_TOKEN=s3cret value";
        assert_eq!(redact_sensitive(line), "GOVCTL_API_TOKEN=<redacted> value");
    }
}
