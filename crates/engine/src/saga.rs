//! Compensated multi-connector updates.
//!
//! Some console actions touch several connectors: enabling bot detection
//! writes captcha properties on the login, self sign-up, and account
//! recovery connectors. The original issued these sequentially and left
//! earlier writes in place when a later one failed, without saying which
//! step broke. Here the sequence is a saga: each step carries a
//! compensating payload, and a failure rolls completed steps back in
//! reverse order before reporting the failing step by name.

use async_trait::async_trait;
use govctl_api::{ConsoleClient, GatewayError};
use govctl_registry::{ConsoleConfig, connectors};
use govctl_types::{PropertyRevision, UpdatePayload};
use thiserror::Error;
use tracing::{error, info, warn};

/// Write access to connector configuration, abstracted for testing.
#[async_trait]
pub trait ConnectorWriter: Send + Sync {
    async fn apply(
        &self,
        category_id: &str,
        connector_id: &str,
        payload: &UpdatePayload,
    ) -> Result<(), GatewayError>;
}

#[async_trait]
impl ConnectorWriter for ConsoleClient {
    async fn apply(
        &self,
        category_id: &str,
        connector_id: &str,
        payload: &UpdatePayload,
    ) -> Result<(), GatewayError> {
        self.update_connector(category_id, connector_id, payload).await
    }
}

/// One step of a multi-connector update.
#[derive(Debug, Clone)]
pub struct SagaStep {
    /// Human-readable step name, used in failure reports
    pub label: String,
    pub category_id: String,
    pub connector_id: String,
    /// Payload applied when the saga runs forward
    pub payload: UpdatePayload,
    /// Payload applied to undo this step when a later step fails.
    ///
    /// Declared up front as the inverse of `payload`, not captured from
    /// server state before the step ran: rollback restores the intended
    /// pre-toggle configuration, and will overwrite values that were
    /// already inconsistent with it before the saga started.
    pub compensation: UpdatePayload,
}

/// Saga failure, naming the step that broke and whether completed steps
/// were successfully rolled back.
#[derive(Debug, Error)]
#[error("step '{step}' failed{}: {source}", if *compensated { ", earlier steps rolled back" } else { ", rollback incomplete" })]
pub struct SagaError {
    pub step: String,
    /// Whether every compensating update for the completed steps succeeded
    pub compensated: bool,
    #[source]
    pub source: GatewayError,
}

/// An ordered sequence of compensated connector updates.
#[derive(Debug, Clone, Default)]
pub struct UpdateSaga {
    steps: Vec<SagaStep>,
}

impl UpdateSaga {
    pub fn new(steps: Vec<SagaStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[SagaStep] {
        &self.steps
    }

    /// Run every step in order. On failure, apply the compensations of the
    /// already-completed steps in reverse order, then report the failing
    /// step.
    pub async fn run(&self, writer: &dyn ConnectorWriter) -> Result<(), SagaError> {
        for (index, step) in self.steps.iter().enumerate() {
            if let Err(source) = writer.apply(&step.category_id, &step.connector_id, &step.payload).await {
                error!(step = %step.label, error = %source, "saga step failed; compensating");
                let compensated = self.compensate(writer, index).await;
                return Err(SagaError {
                    step: step.label.clone(),
                    compensated,
                    source,
                });
            }
            info!(step = %step.label, "saga step applied");
        }
        Ok(())
    }

    /// Undo steps `0..completed` in reverse order. Returns whether every
    /// compensation succeeded; a failed compensation is logged and skipped
    /// so the remaining ones still run.
    async fn compensate(&self, writer: &dyn ConnectorWriter, completed: usize) -> bool {
        let mut all_succeeded = true;
        for step in self.steps[..completed].iter().rev() {
            if let Err(error) = writer
                .apply(&step.category_id, &step.connector_id, &step.compensation)
                .await
            {
                warn!(step = %step.label, error = %error, "compensation failed");
                all_succeeded = false;
            }
        }
        all_succeeded
    }
}

/// The bot-detection toggle saga: switching captcha-based bot detection
/// writes properties on three connectors.
pub fn bot_detection_toggle(enabled: bool, config: &ConsoleConfig) -> UpdateSaga {
    let flag = enabled.to_string();
    let undo = (!enabled).to_string();
    let toggle_property = config
        .toggle_property(connectors::BOT_DETECTION_CONNECTOR)
        .unwrap_or(connectors::BOT_DETECTION_ENABLE);

    UpdateSaga::new(vec![
        SagaStep {
            label: "login captcha".into(),
            category_id: connectors::LOGIN_SECURITY_CATEGORY_ID.into(),
            connector_id: connectors::BOT_DETECTION_CONNECTOR_ID.into(),
            payload: UpdatePayload::update(vec![
                PropertyRevision::new(toggle_property, &flag),
                PropertyRevision::new(connectors::RE_CAPTCHA_ALWAYS_ENABLE, &flag),
            ]),
            compensation: UpdatePayload::update(vec![
                PropertyRevision::new(toggle_property, &undo),
                PropertyRevision::new(connectors::RE_CAPTCHA_ALWAYS_ENABLE, &undo),
            ]),
        },
        SagaStep {
            label: "self sign-up captcha".into(),
            category_id: connectors::USER_ONBOARDING_CATEGORY_ID.into(),
            connector_id: connectors::SELF_SIGN_UP_CONNECTOR_ID.into(),
            payload: UpdatePayload::update(vec![PropertyRevision::new(
                connectors::SELF_REGISTRATION_RE_CAPTCHA,
                &flag,
            )]),
            compensation: UpdatePayload::update(vec![PropertyRevision::new(
                connectors::SELF_REGISTRATION_RE_CAPTCHA,
                &undo,
            )]),
        },
        SagaStep {
            label: "account recovery captcha".into(),
            category_id: connectors::ACCOUNT_MANAGEMENT_CATEGORY_ID.into(),
            connector_id: connectors::ACCOUNT_RECOVERY_CONNECTOR_ID.into(),
            payload: UpdatePayload::update(vec![PropertyRevision::new(
                connectors::PASSWORD_RECOVERY_RE_CAPTCHA,
                &flag,
            )]),
            compensation: UpdatePayload::update(vec![PropertyRevision::new(
                connectors::PASSWORD_RECOVERY_RE_CAPTCHA,
                &undo,
            )]),
        },
    ])
}
