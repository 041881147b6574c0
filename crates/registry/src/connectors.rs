//! Built-in projections for the stock governance connectors.
//!
//! Wire property names, identifiers, and field constraints mirror the
//! connectors shipped by the identity server. Radio-group option order is the
//! documented per-connector resolution priority and must not be reordered
//! casually: when storage holds more than one flag truthy, the first listed
//! option wins.

use govctl_types::form::ValueConstraints;

use crate::models::{FieldSpec, ProjectionSpec, RadioOption};

// Category identifiers (API path segments).
pub const ACCOUNT_MANAGEMENT_CATEGORY_ID: &str = "QWNjb3VudCBNYW5hZ2VtZW50";
pub const USER_ONBOARDING_CATEGORY_ID: &str = "VXNlciBPbmJvYXJkaW5n";
pub const LOGIN_SECURITY_CATEGORY_ID: &str = "TG9naW4gQXR0ZW1wdHMgU2VjdXJpdHk";

// Connector identifiers (API path segments).
pub const ACCOUNT_LOCK_CONNECTOR_ID: &str = "YWNjb3VudC5sb2NrLmhhbmRsZXI";
pub const BOT_DETECTION_CONNECTOR_ID: &str = "c3NvLmxvZ2luLnJlY2FwdGNoYQ";
pub const SELF_SIGN_UP_CONNECTOR_ID: &str = "c2VsZi1zaWduLXVw";
pub const ACCOUNT_RECOVERY_CONNECTOR_ID: &str = "YWNjb3VudC1yZWNvdmVyeQ";
pub const ASK_PASSWORD_CONNECTOR_ID: &str = "dXNlci1lbWFpbC12ZXJpZmljYXRpb24";

// Canonical connector names.
pub const LOGIN_ATTEMPT_SECURITY_CONNECTOR: &str = "account.lock.handler";
pub const BOT_DETECTION_CONNECTOR: &str = "sso.login.recaptcha";
pub const SELF_REGISTRATION_CONNECTOR: &str = "self-sign-up";
pub const PASSWORD_RECOVERY_CONNECTOR: &str = "account-recovery";
pub const ASK_PASSWORD_CONNECTOR: &str = "user-email-verification";

// Connector enable/disable toggle properties.
pub const ACCOUNT_LOCK_ENABLE: &str = "account.lock.handler.enable";
pub const BOT_DETECTION_ENABLE: &str = "sso.login.recaptcha.enable";
pub const SELF_REGISTRATION_ENABLE: &str = "SelfRegistration.Enable";
pub const PASSWORD_RECOVERY_ENABLE: &str = "Recovery.Notification.Password.Enable";
pub const ASK_PASSWORD_ENABLE: &str = "EmailVerification.Enable";

// Captcha properties touched by the bot-detection toggle across connectors.
pub const RE_CAPTCHA_ALWAYS_ENABLE: &str = "sso.login.recaptcha.enable.always";
pub const SELF_REGISTRATION_RE_CAPTCHA: &str = "SelfRegistration.ReCaptcha";
pub const PASSWORD_RECOVERY_RE_CAPTCHA: &str = "Recovery.ReCaptcha.Password.Enable";

/// The projection specs bundled with the registry.
pub fn builtin_projections() -> Vec<ProjectionSpec> {
    vec![
        login_attempt_security(),
        password_recovery(),
        self_registration(),
        ask_password(),
        bot_detection(),
    ]
}

/// Login-attempt security: account locking on consecutive failures.
pub fn login_attempt_security() -> ProjectionSpec {
    ProjectionSpec {
        connector: LOGIN_ATTEMPT_SECURITY_CONNECTOR.into(),
        category_id: LOGIN_SECURITY_CATEGORY_ID.into(),
        connector_id: ACCOUNT_LOCK_CONNECTOR_ID.into(),
        fields: vec![
            FieldSpec::number(
                "maxFailedAttempts",
                "account.lock.handler.On.Failure.Max.Attempts",
                with_max_length(ValueConstraints::required_integer(1, 10), 2),
            ),
            FieldSpec::number(
                "accountLockTime",
                "account.lock.handler.Time",
                with_max_length(ValueConstraints::required_integer(1, 1440), 4),
            ),
            FieldSpec::number(
                "accountLockIncrementFactor",
                "account.lock.handler.login.fail.timeout.ratio",
                with_max_length(ValueConstraints::optional_integer(1, 10), 2),
            ),
            FieldSpec::toggle(
                "notifyUserOnAccountLockIncrement",
                "account.lock.handler.notification.notifyOnLockIncrement",
            ),
            FieldSpec::toggle(
                "manageNotificationsInternally",
                "account.lock.handler.notification.manageInternally",
            ),
        ],
    }
}

/// Password recovery over email link, email OTP, or SMS OTP.
///
/// The recovery-channel priority is SMS OTP, then email OTP, then email link;
/// with no flag truthy the channel falls back to the email link.
pub fn password_recovery() -> ProjectionSpec {
    ProjectionSpec {
        connector: PASSWORD_RECOVERY_CONNECTOR.into(),
        category_id: ACCOUNT_MANAGEMENT_CATEGORY_ID.into(),
        connector_id: ACCOUNT_RECOVERY_CONNECTOR_ID.into(),
        fields: vec![
            FieldSpec::toggle("notifySuccess", "Recovery.NotifySuccess"),
            FieldSpec::number_with_zero_default(
                "expiryTime",
                "Recovery.ExpiryTime",
                with_max_length(ValueConstraints::required_integer(1, 10080), 5),
                1440,
            ),
            FieldSpec::number_with_zero_default(
                "smsOtpExpiryTime",
                "Recovery.Notification.Password.ExpiryTime.smsOtp",
                with_max_length(ValueConstraints::required_integer(1, 1440), 4),
                5,
            ),
            FieldSpec::radio_group(
                "recoveryChannel",
                vec![
                    RadioOption::new("sms-otp", "Recovery.Notification.Password.smsOtp.Enable"),
                    RadioOption::new("email-otp", "Recovery.Notification.Password.OTP.SendOTPInEmail"),
                    RadioOption::new("email-link", "Recovery.Notification.Password.emailLink.Enable"),
                ],
                "email-link",
            ),
            FieldSpec::number(
                "otpLength",
                "Recovery.Notification.Password.OTP.OTPLength",
                ValueConstraints::optional_integer(4, 10),
            ),
            FieldSpec::toggle(
                "otpUseUppercase",
                "Recovery.Notification.Password.OTP.UseUppercaseCharactersInOTP",
            ),
            FieldSpec::toggle(
                "otpUseLowercase",
                "Recovery.Notification.Password.OTP.UseLowercaseCharactersInOTP",
            ),
            FieldSpec::toggle("otpUseNumeric", "Recovery.Notification.Password.OTP.UseNumbersInOTP"),
            FieldSpec::number(
                "maxResendCount",
                "Recovery.Notification.Password.MaxResendAttempts",
                ValueConstraints::optional_integer(1, 10),
            ),
            FieldSpec::number(
                "maxFailedAttemptCount",
                "Recovery.Notification.Password.MaxFailedAttempts",
                ValueConstraints::optional_integer(1, 10),
            ),
        ],
    }
}

/// Self registration (self sign-up) for end users.
pub fn self_registration() -> ProjectionSpec {
    ProjectionSpec {
        connector: SELF_REGISTRATION_CONNECTOR.into(),
        category_id: USER_ONBOARDING_CATEGORY_ID.into(),
        connector_id: SELF_SIGN_UP_CONNECTOR_ID.into(),
        fields: vec![
            FieldSpec::toggle("lockOnCreation", "SelfRegistration.LockOnCreation"),
            FieldSpec::toggle("sendConfirmationOnCreation", "SelfRegistration.SendConfirmationOnCreation"),
            FieldSpec::toggle("notifyAccountConfirmation", "SelfRegistration.NotifyAccountConfirmation"),
            FieldSpec::toggle("autoLogin", "SelfRegistration.AutoLogin.Enable"),
            FieldSpec::number_with_zero_default(
                "verificationExpiryTime",
                "SelfRegistration.VerificationCode.ExpiryTime",
                with_max_length(ValueConstraints::required_integer(1, 10080), 5),
                1440,
            ),
            FieldSpec::number_with_zero_default(
                "smsOtpExpiryTime",
                "SelfRegistration.VerificationCode.SMSOTP.ExpiryTime",
                with_max_length(ValueConstraints::required_integer(1, 1440), 4),
                5,
            ),
            FieldSpec::text(
                "smsOtpRegex",
                "SelfRegistration.SMSOTP.Regex",
                ValueConstraints {
                    max_length: Some(64),
                    ..ValueConstraints::default()
                },
            ),
            FieldSpec::text(
                "callbackRegex",
                "SelfRegistration.CallbackRegex",
                ValueConstraints {
                    required: true,
                    max_length: Some(128),
                    ..ValueConstraints::default()
                },
            ),
        ],
    }
}

/// Invite-user-to-set-password onboarding (the ask-password flow).
///
/// The verification option checks SMS OTP, then email OTP; the email link
/// has no wire property of its own — it is in effect when neither OTP flag
/// is truthy, and selecting it serializes both OTP flags to `"false"`.
/// An expiry of `-1` never expires the invitation and `0` expires it
/// immediately, so both sit below the usual minimum of one minute.
pub fn ask_password() -> ProjectionSpec {
    ProjectionSpec {
        connector: ASK_PASSWORD_CONNECTOR.into(),
        category_id: USER_ONBOARDING_CATEGORY_ID.into(),
        connector_id: ASK_PASSWORD_CONNECTOR_ID.into(),
        fields: vec![
            FieldSpec::toggle("lockOnCreation", "EmailVerification.LockOnCreation"),
            FieldSpec::toggle(
                "sendAccountActivationEmail",
                "EmailVerification.AskPassword.AccountActivation",
            ),
            FieldSpec::number(
                "expiryTime",
                "EmailVerification.AskPassword.ExpiryTime",
                with_max_length(ValueConstraints::required_integer(-1, 10080), 5),
            ),
            FieldSpec::radio_group(
                "verificationOption",
                vec![
                    RadioOption::new("sms-otp", "EmailVerification.AskPassword.SMSOTP"),
                    RadioOption::new("email-otp", "EmailVerification.AskPassword.EmailOTP"),
                    RadioOption::unbacked("email-link"),
                ],
                "email-link",
            ),
            FieldSpec::number(
                "otpLength",
                "EmailVerification.OTP.OTPLength",
                ValueConstraints::required_integer(4, 10),
            ),
            FieldSpec::toggle("otpUseUppercase", "EmailVerification.OTP.UseUppercaseCharactersInOTP"),
            FieldSpec::toggle("otpUseLowercase", "EmailVerification.OTP.UseLowercaseCharactersInOTP"),
            FieldSpec::toggle("otpUseNumeric", "EmailVerification.OTP.UseNumbersInOTP"),
        ],
    }
}

/// Bot detection via reCaptcha on the login flow.
///
/// "Always" takes precedence over "after max failed attempts" when storage
/// holds both flags truthy.
pub fn bot_detection() -> ProjectionSpec {
    ProjectionSpec {
        connector: BOT_DETECTION_CONNECTOR.into(),
        category_id: LOGIN_SECURITY_CATEGORY_ID.into(),
        connector_id: BOT_DETECTION_CONNECTOR_ID.into(),
        fields: vec![FieldSpec::radio_group(
            "promptMode",
            vec![
                RadioOption::new("always", "sso.login.recaptcha.enable.always"),
                RadioOption::new(
                    "after-max-failed-attempts",
                    "sso.login.recaptcha.on.max.failed.attempts",
                ),
            ],
            "after-max-failed-attempts",
        )],
    }
}

fn with_max_length(mut constraints: ValueConstraints, max_length: usize) -> ValueConstraints {
    constraints.max_length = Some(max_length);
    constraints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldKind;

    #[test]
    fn recovery_channel_priority_checks_sms_first() {
        let spec = password_recovery();
        let field = spec.field("recoveryChannel").expect("recovery channel field exists");
        let FieldKind::RadioGroup { options, fallback } = &field.kind else {
            panic!("recoveryChannel must be a radio group");
        };

        let tags: Vec<&str> = options.iter().map(|option| option.tag.as_str()).collect();
        assert_eq!(tags, vec!["sms-otp", "email-otp", "email-link"]);
        assert_eq!(fallback, "email-link");
    }

    #[test]
    fn ask_password_email_link_has_no_wire_property() {
        let spec = ask_password();
        spec.validate().expect("ask-password spec is well formed");

        let field = spec.field("verificationOption").expect("verification option exists");
        let FieldKind::RadioGroup { options, fallback } = &field.kind else {
            panic!("verificationOption must be a radio group");
        };

        let tags: Vec<&str> = options.iter().map(|option| option.tag.as_str()).collect();
        assert_eq!(tags, vec!["sms-otp", "email-otp", "email-link"]);
        assert_eq!(fallback, "email-link");

        let email_link = options.iter().find(|option| option.tag == "email-link").unwrap();
        assert_eq!(email_link.property, None);
    }

    #[test]
    fn ask_password_expiry_allows_the_never_expire_sentinel() {
        let spec = ask_password();
        let field = spec.field("expiryTime").expect("expiry field exists");
        let FieldKind::Number { constraints, .. } = &field.kind else {
            panic!("expiryTime must be a number field");
        };
        assert_eq!(constraints.min_value, Some(-1));
    }

    #[test]
    fn expiry_fields_declare_zero_defaults() {
        let spec = password_recovery();
        let field = spec.field("expiryTime").expect("expiry field exists");
        let FieldKind::Number { zero_default, .. } = &field.kind else {
            panic!("expiryTime must be a number field");
        };
        assert_eq!(*zero_default, Some(1440));
    }
}
