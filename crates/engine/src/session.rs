//! Edit-session lifecycle for one connector form.
//!
//! The original console let overlapping fetch/submit cycles race, with the
//! last response to resolve winning regardless of issue order. A session
//! instead stamps every fetch with a monotone generation; a response arriving
//! for a superseded generation is discarded and the caller told so.

use govctl_registry::ProjectionSpec;
use govctl_types::{FormState, FormValue, PropertyCatalog, UpdatePayload, ValidationErrors};
use thiserror::Error;
use tracing::debug;

use crate::{reconcile, validate_form};

/// Opaque stamp identifying one in-flight fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

/// What became of a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was current and the form state was rebuilt from it.
    Applied,
    /// A newer fetch superseded this one; the response was discarded.
    Stale,
}

/// Errors raised by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No catalog has been applied yet; there is nothing to edit or submit.
    #[error("no connector catalog loaded")]
    NotLoaded,
    /// The edited field is not part of the projection.
    #[error("unknown field '{0}'")]
    UnknownField(String),
    /// Validation failed; the payload was not built.
    #[error("form state fails validation for {} field(s)", errors.len())]
    Invalid { errors: ValidationErrors },
}

/// Form-editing state machine for one connector.
///
/// Owns the projected form state and the operator's staged edits. Pure state:
/// I/O stays with the caller, which makes overlap/staleness behavior
/// deterministic to test.
#[derive(Debug)]
pub struct EditSession {
    spec: ProjectionSpec,
    generation: u64,
    current: Option<FormState>,
    edits: FormState,
}

impl EditSession {
    pub fn new(spec: ProjectionSpec) -> Self {
        Self {
            spec,
            generation: 0,
            current: None,
            edits: FormState::new(),
        }
    }

    pub fn spec(&self) -> &ProjectionSpec {
        &self.spec
    }

    /// The projected (pre-edit) form state, when a catalog has been applied.
    pub fn current(&self) -> Option<&FormState> {
        self.current.as_ref()
    }

    /// Stamp a new fetch. Every earlier stamp is superseded from this point
    /// on, whether or not its response ever arrives.
    pub fn begin_fetch(&mut self) -> Generation {
        self.generation += 1;
        Generation(self.generation)
    }

    /// Apply a fetched catalog, unless a newer fetch has been stamped since.
    ///
    /// Applying rebuilds the form state from scratch and drops staged edits:
    /// local state is never trusted across a reload.
    pub fn complete_fetch(&mut self, generation: Generation, catalog: &PropertyCatalog) -> FetchOutcome {
        if generation.0 != self.generation {
            debug!(
                stale = generation.0,
                current = self.generation,
                connector = %self.spec.connector,
                "discarding superseded fetch response"
            );
            return FetchOutcome::Stale;
        }

        self.current = Some(crate::project(catalog, &self.spec));
        self.edits = FormState::new();
        FetchOutcome::Applied
    }

    /// Stage one edit.
    pub fn edit(&mut self, field: &str, value: FormValue) -> Result<(), SessionError> {
        if self.current.is_none() {
            return Err(SessionError::NotLoaded);
        }
        if self.spec.field(field).is_none() {
            return Err(SessionError::UnknownField(field.to_string()));
        }
        self.edits.set(field, value);
        Ok(())
    }

    /// The live view: projected state with staged edits overlaid. This is
    /// what validation runs against.
    pub fn live_state(&self) -> Result<FormState, SessionError> {
        let current = self.current.as_ref().ok_or(SessionError::NotLoaded)?;
        let mut live = current.clone();
        for (field, value) in self.edits.iter() {
            live.set(field, value.clone());
        }
        Ok(live)
    }

    /// Validate the live form state.
    pub fn validate(&self) -> Result<ValidationErrors, SessionError> {
        Ok(validate_form(&self.live_state()?, &self.spec))
    }

    /// Build the submit payload, refusing when validation fails.
    pub fn build_payload(&self) -> Result<UpdatePayload, SessionError> {
        let errors = self.validate()?;
        if !errors.is_empty() {
            return Err(SessionError::Invalid { errors });
        }
        let current = self.current.as_ref().ok_or(SessionError::NotLoaded)?;
        Ok(reconcile(current, &self.edits, &self.spec))
    }

    /// Record a successful submit: the local state is discarded so the next
    /// render reloads from the server instead of trusting edits.
    pub fn complete_submit(&mut self) {
        self.current = None;
        self.edits = FormState::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use govctl_registry::connectors;
    use govctl_types::ConnectorProperty;

    fn lock_catalog(max_attempts: &str) -> PropertyCatalog {
        let mut catalog = PropertyCatalog::new(
            connectors::LOGIN_SECURITY_CATEGORY_ID,
            connectors::ACCOUNT_LOCK_CONNECTOR_ID,
        );
        catalog.properties.push(ConnectorProperty::new(
            "account.lock.handler.On.Failure.Max.Attempts",
            max_attempts,
        ));
        catalog
            .properties
            .push(ConnectorProperty::new("account.lock.handler.Time", "10"));
        catalog.properties.push(ConnectorProperty::new(
            "account.lock.handler.login.fail.timeout.ratio",
            "2",
        ));
        catalog
    }

    #[test]
    fn superseded_fetch_response_is_discarded() {
        let mut session = EditSession::new(connectors::login_attempt_security());

        let first = session.begin_fetch();
        let second = session.begin_fetch();

        // The newer request resolves first; the older response must lose
        // even though it arrives last.
        assert_eq!(session.complete_fetch(second, &lock_catalog("5")), FetchOutcome::Applied);
        assert_eq!(session.complete_fetch(first, &lock_catalog("9")), FetchOutcome::Stale);

        let current = session.current().expect("catalog applied");
        assert_eq!(current.text_or_empty("maxFailedAttempts"), "5");
    }

    #[test]
    fn refetch_drops_staged_edits() {
        let mut session = EditSession::new(connectors::login_attempt_security());
        let generation = session.begin_fetch();
        session.complete_fetch(generation, &lock_catalog("5"));
        session
            .edit("maxFailedAttempts", FormValue::Text("3".into()))
            .expect("edit known field");

        let generation = session.begin_fetch();
        session.complete_fetch(generation, &lock_catalog("7"));

        let payload = session.build_payload().expect("valid state");
        assert_eq!(payload.value_of("account.lock.handler.On.Failure.Max.Attempts"), Some("7"));
    }

    #[test]
    fn editing_before_load_and_unknown_fields_are_rejected() {
        let mut session = EditSession::new(connectors::login_attempt_security());
        assert!(matches!(
            session.edit("maxFailedAttempts", FormValue::Text("3".into())),
            Err(SessionError::NotLoaded)
        ));

        let generation = session.begin_fetch();
        session.complete_fetch(generation, &lock_catalog("5"));
        assert!(matches!(
            session.edit("noSuchField", FormValue::Bool(true)),
            Err(SessionError::UnknownField(_))
        ));
    }

    #[test]
    fn invalid_state_blocks_payload_construction() {
        let mut session = EditSession::new(connectors::login_attempt_security());
        let generation = session.begin_fetch();
        session.complete_fetch(generation, &lock_catalog("5"));
        session
            .edit("maxFailedAttempts", FormValue::Text("99".into()))
            .expect("edit known field");

        match session.build_payload() {
            Err(SessionError::Invalid { errors }) => {
                assert!(errors.message_for("maxFailedAttempts").is_some());
            }
            other => panic!("expected validation failure, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn successful_submit_forces_a_reload() {
        let mut session = EditSession::new(connectors::login_attempt_security());
        let generation = session.begin_fetch();
        session.complete_fetch(generation, &lock_catalog("5"));

        session
            .edit("maxFailedAttempts", FormValue::Text("3".into()))
            .expect("edit known field");
        let payload = session.build_payload().expect("valid state");
        assert_eq!(payload.value_of("account.lock.handler.On.Failure.Max.Attempts"), Some("3"));

        session.complete_submit();
        assert!(session.current().is_none());
        assert!(matches!(session.build_payload(), Err(SessionError::NotLoaded)));
    }
}
