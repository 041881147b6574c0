//! Catalog-to-form-state projection.

use govctl_registry::{FieldKind, ProjectionSpec};
use govctl_types::{FormState, FormValue, PropertyCatalog};
use govctl_util::parse_boolean;

/// Project a property catalog into typed form state.
///
/// Pure function of catalog and spec; the catalog is never mutated. Scalar
/// fields whose backing property is absent from the catalog stay unset —
/// the consumer decides the UI-level default. Radio groups always resolve:
/// options are evaluated in declared priority order and the first truthy one
/// wins, falling back to the spec's documented fallback tag when none are.
pub fn project(catalog: &PropertyCatalog, spec: &ProjectionSpec) -> FormState {
    let mut state = FormState::new();

    for field in &spec.fields {
        match &field.kind {
            FieldKind::Toggle { property } => {
                if let Some(value) = catalog.value_of(property) {
                    state.set(&field.name, FormValue::Bool(parse_boolean(value)));
                }
            }
            FieldKind::Number { property, .. } | FieldKind::Text { property, .. } => {
                // Numbers keep their original string form; parsing happens
                // at validation/submit time.
                if let Some(value) = catalog.value_of(property) {
                    state.set(&field.name, FormValue::Text(value.to_string()));
                }
            }
            FieldKind::RadioGroup { options, fallback } => {
                let selected = options
                    .iter()
                    .find(|option| {
                        option
                            .property
                            .as_deref()
                            .is_some_and(|property| parse_boolean(catalog.value_or(property, "false")))
                    })
                    .map(|option| option.tag.clone())
                    .unwrap_or_else(|| fallback.clone());
                state.set(&field.name, FormValue::Choice(selected));
            }
        }
    }

    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use govctl_registry::connectors;
    use govctl_types::ConnectorProperty;

    fn recovery_catalog(properties: &[(&str, &str)]) -> PropertyCatalog {
        let mut catalog = PropertyCatalog::new(
            connectors::ACCOUNT_MANAGEMENT_CATEGORY_ID,
            connectors::ACCOUNT_RECOVERY_CONNECTOR_ID,
        );
        for (name, value) in properties {
            catalog.properties.push(ConnectorProperty::new(*name, *value));
        }
        catalog
    }

    #[test]
    fn boolean_parse_is_strict_and_fail_safe() {
        let spec = connectors::password_recovery();
        let catalog = recovery_catalog(&[("Recovery.NotifySuccess", "TRUE")]);

        let state = project(&catalog, &spec);
        assert_eq!(state.get("notifySuccess"), Some(&FormValue::Bool(false)));
    }

    #[test]
    fn absent_scalar_property_leaves_field_unset() {
        let spec = connectors::password_recovery();
        let catalog = recovery_catalog(&[]);

        let state = project(&catalog, &spec);
        assert!(!state.contains("expiryTime"));
        assert!(!state.contains("notifySuccess"));
    }

    #[test]
    fn radio_group_resolves_by_priority_order() {
        let spec = connectors::password_recovery();

        // Inconsistent storage: two channels truthy. SMS is checked first.
        let catalog = recovery_catalog(&[
            ("Recovery.Notification.Password.emailLink.Enable", "true"),
            ("Recovery.Notification.Password.smsOtp.Enable", "true"),
        ]);
        let state = project(&catalog, &spec);
        assert_eq!(state.get("recoveryChannel"), Some(&FormValue::Choice("sms-otp".into())));
    }

    #[test]
    fn radio_group_falls_back_when_no_option_is_truthy() {
        let spec = connectors::password_recovery();
        let catalog = recovery_catalog(&[]);

        let state = project(&catalog, &spec);
        assert_eq!(
            state.get("recoveryChannel"),
            Some(&FormValue::Choice("email-link".into()))
        );
    }

    #[test]
    fn unbacked_radio_tag_wins_when_no_backed_option_is_truthy() {
        let spec = connectors::ask_password();
        let mut catalog = PropertyCatalog::new(
            connectors::USER_ONBOARDING_CATEGORY_ID,
            connectors::ASK_PASSWORD_CONNECTOR_ID,
        );
        catalog
            .properties
            .push(ConnectorProperty::new("EmailVerification.AskPassword.SMSOTP", "false"));
        catalog
            .properties
            .push(ConnectorProperty::new("EmailVerification.AskPassword.EmailOTP", "false"));

        let state = project(&catalog, &spec);
        assert_eq!(
            state.get("verificationOption"),
            Some(&FormValue::Choice("email-link".into()))
        );

        catalog.properties[0].value = "true".into();
        let state = project(&catalog, &spec);
        assert_eq!(state.get("verificationOption"), Some(&FormValue::Choice("sms-otp".into())));
    }

    #[test]
    fn number_fields_keep_wire_strings() {
        let spec = connectors::login_attempt_security();
        let mut catalog = PropertyCatalog::new(
            connectors::LOGIN_SECURITY_CATEGORY_ID,
            connectors::ACCOUNT_LOCK_CONNECTOR_ID,
        );
        catalog
            .properties
            .push(ConnectorProperty::new("account.lock.handler.Time", "10"));

        let state = project(&catalog, &spec);
        assert_eq!(state.get("accountLockTime"), Some(&FormValue::Text("10".into())));
    }
}
