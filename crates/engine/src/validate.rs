//! Form-level validation against a projection's declarative constraints.

use govctl_registry::{FieldKind, ProjectionSpec};
use govctl_types::form::validation::validate_text;
use govctl_types::{FormState, FormValue, ValidationErrors};

/// Validate live form state.
///
/// Each rule is a pure predicate over one field plus its static constraints;
/// fields are checked independently and the result carries a message per
/// failing field. Synchronous and I/O-free, so callers can re-run it on every
/// change event. A non-empty result blocks submission client-side only — the
/// server remains the authority and can still reject a payload that passed
/// here.
pub fn validate_form(state: &FormState, spec: &ProjectionSpec) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    for field in &spec.fields {
        match &field.kind {
            FieldKind::Number { constraints, .. } | FieldKind::Text { constraints, .. } => {
                let candidate = state.text_or_empty(&field.name);
                if let Err(message) = validate_text(candidate, constraints) {
                    errors.insert(&field.name, message);
                }
            }
            FieldKind::RadioGroup { options, .. } => {
                if let Some(selected) = state.get(&field.name).and_then(FormValue::as_choice)
                    && !options.iter().any(|option| option.tag == selected)
                {
                    errors.insert(&field.name, format!("'{}' is not one of the available options", selected));
                }
            }
            FieldKind::Toggle { .. } => {}
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use govctl_registry::connectors;

    #[test]
    fn empty_required_integer_blocks_submission() {
        let spec = connectors::login_attempt_security();
        let mut state = FormState::new();
        state.set("maxFailedAttempts", FormValue::Text(String::new()));
        state.set("accountLockTime", FormValue::Text("10".into()));

        let errors = validate_form(&state, &spec);
        assert!(errors.message_for("maxFailedAttempts").is_some());
        assert_eq!(errors.message_for("accountLockTime"), None);
    }

    #[test]
    fn in_range_integer_passes() {
        let spec = connectors::login_attempt_security();
        let mut state = FormState::new();
        state.set("maxFailedAttempts", FormValue::Text("5".into()));
        state.set("accountLockTime", FormValue::Text("10".into()));

        let errors = validate_form(&state, &spec);
        assert!(errors.is_empty());
    }

    #[test]
    fn out_of_range_and_non_numeric_values_are_reported_per_field() {
        let spec = connectors::login_attempt_security();
        let mut state = FormState::new();
        state.set("maxFailedAttempts", FormValue::Text("99".into()));
        state.set("accountLockTime", FormValue::Text("soon".into()));

        let errors = validate_form(&state, &spec);
        assert_eq!(errors.len(), 2);
        assert!(errors.message_for("maxFailedAttempts").is_some());
        assert!(errors.message_for("accountLockTime").is_some());
    }

    #[test]
    fn unknown_radio_tag_is_rejected() {
        let spec = connectors::password_recovery();
        let mut state = FormState::new();
        state.set("recoveryChannel", FormValue::Choice("carrier-pigeon".into()));

        let errors = validate_form(&state, &spec);
        assert!(errors.message_for("recoveryChannel").is_some());
    }

    #[test]
    fn optional_fields_may_stay_empty() {
        let spec = connectors::login_attempt_security();
        let mut state = FormState::new();
        state.set("maxFailedAttempts", FormValue::Text("5".into()));
        state.set("accountLockTime", FormValue::Text("10".into()));
        state.set("accountLockIncrementFactor", FormValue::Text(String::new()));

        let errors = validate_form(&state, &spec);
        assert!(errors.is_empty());
    }
}
