//! Form-state-to-payload reconciliation.

use govctl_registry::{FieldKind, ProjectionSpec};
use govctl_types::{FormState, FormValue, PropertyRevision, UpdatePayload};
use govctl_util::parse::is_zero;

/// Build the update payload for an edit session.
///
/// For every field the edited value wins when present, else the current
/// (projected) value carries over — a field the user never touched is never
/// silently dropped. Radio groups expand exhaustively: every backed member
/// property appears in the payload and at most one is `"true"` (exactly one
/// unless the selected tag is unbacked), so one UI action fully determines
/// the server-side group state. Number fields declared with a zero-default
/// have an *edited* numeric-zero value replaced by that default before
/// serialization; a zero that came from the catalog passes through
/// untouched, so an untouched form round-trips exactly.
///
/// Scalar fields absent from both states (their property was missing from
/// the fetched catalog) are omitted rather than invented.
pub fn reconcile(current: &FormState, edits: &FormState, spec: &ProjectionSpec) -> UpdatePayload {
    let mut properties = Vec::new();

    for field in &spec.fields {
        let edited = edits.get(&field.name);
        let resolved = edited.or_else(|| current.get(&field.name));

        match &field.kind {
            FieldKind::Toggle { property } | FieldKind::Text { property, .. } => {
                if let Some(value) = resolved {
                    properties.push(PropertyRevision::new(property, value.to_wire()));
                }
            }
            FieldKind::Number { property, zero_default, .. } => {
                if let Some(value) = resolved {
                    let mut wire = value.to_wire();
                    if let Some(default) = zero_default
                        && edited.is_some()
                        && is_zero(&wire)
                    {
                        wire = default.to_string();
                    }
                    properties.push(PropertyRevision::new(property, wire));
                }
            }
            FieldKind::RadioGroup { options, fallback } => {
                let selected = resolved
                    .and_then(FormValue::as_choice)
                    .unwrap_or(fallback.as_str())
                    .to_string();
                for option in options {
                    if let Some(property) = &option.property {
                        properties.push(PropertyRevision::new(property, (option.tag == selected).to_string()));
                    }
                }
            }
        }
    }

    UpdatePayload::update(properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project;
    use govctl_registry::connectors;
    use govctl_types::{ConnectorProperty, PropertyCatalog};

    fn catalog_from(category: &str, connector: &str, properties: &[(&str, &str)]) -> PropertyCatalog {
        let mut catalog = PropertyCatalog::new(category, connector);
        for (name, value) in properties {
            catalog.properties.push(ConnectorProperty::new(*name, *value));
        }
        catalog
    }

    #[test]
    fn untouched_submission_round_trips_projected_values() {
        let spec = connectors::login_attempt_security();
        let catalog = catalog_from(
            connectors::LOGIN_SECURITY_CATEGORY_ID,
            connectors::ACCOUNT_LOCK_CONNECTOR_ID,
            &[
                ("account.lock.handler.On.Failure.Max.Attempts", "5"),
                ("account.lock.handler.Time", "10"),
                ("account.lock.handler.login.fail.timeout.ratio", "2"),
                ("account.lock.handler.notification.notifyOnLockIncrement", "false"),
                ("account.lock.handler.notification.manageInternally", "true"),
            ],
        );

        let current = project(&catalog, &spec);
        let payload = reconcile(&current, &FormState::new(), &spec);

        for property in &catalog.properties {
            assert_eq!(
                payload.value_of(&property.name),
                Some(property.value.as_str()),
                "property '{}' must survive an untouched round trip",
                property.name
            );
        }
    }

    #[test]
    fn account_lock_edit_changes_only_the_edited_property() {
        let spec = connectors::login_attempt_security();
        let catalog = catalog_from(
            connectors::LOGIN_SECURITY_CATEGORY_ID,
            connectors::ACCOUNT_LOCK_CONNECTOR_ID,
            &[
                ("account.lock.handler.On.Failure.Max.Attempts", "5"),
                ("account.lock.handler.Time", "10"),
                ("account.lock.handler.login.fail.timeout.ratio", "2"),
            ],
        );

        let current = project(&catalog, &spec);
        let mut edits = FormState::new();
        edits.set("maxFailedAttempts", FormValue::Text("3".into()));

        let payload = reconcile(&current, &edits, &spec);

        assert_eq!(payload.value_of("account.lock.handler.On.Failure.Max.Attempts"), Some("3"));
        assert_eq!(payload.value_of("account.lock.handler.Time"), Some("10"));
        assert_eq!(payload.value_of("account.lock.handler.login.fail.timeout.ratio"), Some("2"));
    }

    #[test]
    fn radio_group_expansion_is_exhaustive_and_exclusive() {
        let spec = connectors::password_recovery();
        let catalog = catalog_from(
            connectors::ACCOUNT_MANAGEMENT_CATEGORY_ID,
            connectors::ACCOUNT_RECOVERY_CONNECTOR_ID,
            &[("Recovery.Notification.Password.emailLink.Enable", "true")],
        );

        let current = project(&catalog, &spec);
        let mut edits = FormState::new();
        edits.set("recoveryChannel", FormValue::Choice("sms-otp".into()));

        let payload = reconcile(&current, &edits, &spec);

        let group = [
            "Recovery.Notification.Password.smsOtp.Enable",
            "Recovery.Notification.Password.OTP.SendOTPInEmail",
            "Recovery.Notification.Password.emailLink.Enable",
        ];
        let truthy: Vec<&str> = group
            .iter()
            .filter(|name| payload.value_of(name) == Some("true"))
            .copied()
            .collect();
        assert_eq!(truthy, vec!["Recovery.Notification.Password.smsOtp.Enable"]);
        for name in group {
            assert!(payload.value_of(name).is_some(), "group member '{}' must be present", name);
        }
    }

    #[test]
    fn unbacked_radio_tag_clears_every_backed_member() {
        let spec = connectors::ask_password();
        let catalog = catalog_from(
            connectors::USER_ONBOARDING_CATEGORY_ID,
            connectors::ASK_PASSWORD_CONNECTOR_ID,
            &[("EmailVerification.AskPassword.SMSOTP", "true")],
        );

        let current = project(&catalog, &spec);
        let mut edits = FormState::new();
        edits.set("verificationOption", FormValue::Choice("email-link".into()));

        let payload = reconcile(&current, &edits, &spec);

        assert_eq!(payload.value_of("EmailVerification.AskPassword.SMSOTP"), Some("false"));
        assert_eq!(payload.value_of("EmailVerification.AskPassword.EmailOTP"), Some("false"));
        assert!(
            payload.properties.iter().all(|revision| !revision.name.contains("email-link")),
            "the unbacked tag must not invent a wire property"
        );
    }

    #[test]
    fn zero_value_is_replaced_by_the_declared_default() {
        let spec = connectors::password_recovery();
        let catalog = catalog_from(
            connectors::ACCOUNT_MANAGEMENT_CATEGORY_ID,
            connectors::ACCOUNT_RECOVERY_CONNECTOR_ID,
            &[("Recovery.ExpiryTime", "60")],
        );

        let current = project(&catalog, &spec);
        let mut edits = FormState::new();
        edits.set("expiryTime", FormValue::Text("0".into()));

        let payload = reconcile(&current, &edits, &spec);
        assert_eq!(payload.value_of("Recovery.ExpiryTime"), Some("1440"));
    }

    #[test]
    fn untouched_zero_from_the_catalog_is_preserved() {
        let spec = connectors::password_recovery();
        let catalog = catalog_from(
            connectors::ACCOUNT_MANAGEMENT_CATEGORY_ID,
            connectors::ACCOUNT_RECOVERY_CONNECTOR_ID,
            &[("Recovery.ExpiryTime", "0")],
        );

        let current = project(&catalog, &spec);
        let payload = reconcile(&current, &FormState::new(), &spec);

        assert_eq!(payload.value_of("Recovery.ExpiryTime"), Some("0"));
    }

    #[test]
    fn fields_absent_from_the_catalog_are_not_invented() {
        let spec = connectors::login_attempt_security();
        let catalog = catalog_from(
            connectors::LOGIN_SECURITY_CATEGORY_ID,
            connectors::ACCOUNT_LOCK_CONNECTOR_ID,
            &[("account.lock.handler.Time", "10")],
        );

        let current = project(&catalog, &spec);
        let payload = reconcile(&current, &FormState::new(), &spec);

        assert_eq!(payload.value_of("account.lock.handler.Time"), Some("10"));
        assert_eq!(payload.value_of("account.lock.handler.On.Failure.Max.Attempts"), None);
    }
}
