//! Per-value validation helpers shared across form consumers.
//!
//! These routines check a single field's text against the declarative
//! constraints carried by its projection entry. They are synchronous, perform
//! no I/O, and only ever block submission client-side; the server remains the
//! authority on final acceptance.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Declarative constraints for one text or numeric field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueConstraints {
    /// Reject empty input
    #[serde(default)]
    pub required: bool,
    /// Input must parse as a base-10 integer
    #[serde(default)]
    pub integer: bool,
    /// Inclusive lower bound, applied after integer parsing
    #[serde(default)]
    pub min_value: Option<i64>,
    /// Inclusive upper bound, applied after integer parsing
    #[serde(default)]
    pub max_value: Option<i64>,
    /// Minimum length in characters
    #[serde(default)]
    pub min_length: Option<usize>,
    /// Maximum length in characters
    #[serde(default)]
    pub max_length: Option<usize>,
    /// Regex the whole input must match
    #[serde(default)]
    pub pattern: Option<String>,
}

impl ValueConstraints {
    /// Constraints for a required integer restricted to `min..=max`.
    pub fn required_integer(min: i64, max: i64) -> Self {
        Self {
            required: true,
            integer: true,
            min_value: Some(min),
            max_value: Some(max),
            ..Self::default()
        }
    }

    /// Constraints for an optional integer restricted to `min..=max`.
    pub fn optional_integer(min: i64, max: i64) -> Self {
        Self {
            integer: true,
            min_value: Some(min),
            max_value: Some(max),
            ..Self::default()
        }
    }
}

/// Validate a candidate string against the declarative constraints.
///
/// Checks run in a fixed order and the first failure wins: required,
/// integer-ness, numeric range, character length, pattern. An empty optional
/// value passes every remaining check.
pub fn validate_text(candidate: &str, constraints: &ValueConstraints) -> Result<(), String> {
    if candidate.is_empty() {
        if constraints.required {
            return Err("This field is required".to_string());
        }
        return Ok(());
    }

    if constraints.integer {
        let Ok(parsed) = candidate.parse::<i64>() else {
            return Err("Value must be an integer".to_string());
        };

        if let Some(min_value) = constraints.min_value
            && parsed < min_value
        {
            return Err(range_message(constraints));
        }
        if let Some(max_value) = constraints.max_value
            && parsed > max_value
        {
            return Err(range_message(constraints));
        }
    }

    let length = candidate.chars().count();
    if let Some(min_length) = constraints.min_length
        && length < min_length
    {
        return Err(format!("Value must be at least {} characters", min_length));
    }
    if let Some(max_length) = constraints.max_length
        && length > max_length
    {
        return Err(format!("Value must be at most {} characters", max_length));
    }

    if let Some(pattern) = &constraints.pattern {
        let regex = Regex::new(pattern).map_err(|error| format!("invalid pattern '{}': {}", pattern, error))?;
        if !regex.is_match(candidate) {
            return Err(format!("Value must match the pattern {}", pattern));
        }
    }

    Ok(())
}

fn range_message(constraints: &ValueConstraints) -> String {
    match (constraints.min_value, constraints.max_value) {
        (Some(min), Some(max)) => format!("Value must be between {} and {}", min, max),
        (Some(min), None) => format!("Value must be at least {}", min),
        (None, Some(max)) => format!("Value must be at most {}", max),
        (None, None) => "Value is out of range".to_string(),
    }
}
