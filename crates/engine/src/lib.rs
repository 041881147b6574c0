//! Projection and reconciliation engine for governance connectors.
//!
//! The engine turns a fetched property catalog into typed form state
//! ([`project`]), turns edited form state back into an update payload
//! ([`reconcile`]), validates live form state against the projection's
//! declarative constraints ([`validate_form`]), and coordinates the
//! surrounding lifecycle: stale-response discarding for overlapping fetches
//! ([`session::EditSession`]) and compensated multi-connector updates
//! ([`saga::UpdateSaga`]).

pub mod alerts;
pub mod projection;
pub mod reconcile;
pub mod saga;
pub mod session;
pub mod validate;

pub use projection::project;
pub use reconcile::reconcile;
pub use saga::{ConnectorWriter, SagaError, SagaStep, UpdateSaga};
pub use session::{EditSession, FetchOutcome, Generation, SessionError};
pub use validate::validate_form;
