//! Registry crate for declarative connector projections.
//!
//! This crate holds the mapping layer between wire-level connector property
//! catalogs and typed, semantically named form fields: the projection spec
//! model, the built-in projections for the stock governance connectors, the
//! category listing merge, and the per-deployment console configuration.

pub mod categories;
pub mod config;
pub mod connectors;
pub mod feat_gate;
pub mod models;

pub use categories::combine_categories;
pub use config::ConsoleConfig;
pub use models::{FieldKind, FieldSpec, ProjectionError, ProjectionRegistry, ProjectionSpec, RadioOption};

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    /// The built-in projection table must load and must not reference any
    /// wire property from two different fields of the same connector.
    #[test]
    fn builtin_projections_are_well_formed() {
        let registry = ProjectionRegistry::builtin();
        assert!(registry.len() >= 4, "expected the stock connector projections");

        for spec in registry.iter() {
            let mut seen: HashSet<&str> = HashSet::new();
            for field in &spec.fields {
                for property in field.property_names() {
                    assert!(
                        seen.insert(property),
                        "connector '{}' references '{}' from two fields",
                        spec.connector,
                        property
                    );
                }
            }
        }
    }

    #[test]
    fn builtin_lookup_is_by_connector_name() {
        let registry = ProjectionRegistry::builtin();
        assert!(registry.find(connectors::LOGIN_ATTEMPT_SECURITY_CONNECTOR).is_some());
        assert!(registry.find("no.such.connector").is_none());
    }
}
