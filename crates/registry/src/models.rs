use govctl_types::form::ValueConstraints;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::connectors;

/// Errors raised when a projection spec violates its structural invariants.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// Two fields of the same projection read or write the same wire
    /// property; the later one would silently overwrite the earlier.
    #[error("property '{property}' is referenced by both '{first_field}' and '{second_field}'")]
    DuplicateProperty {
        property: String,
        first_field: String,
        second_field: String,
    },
    /// Two fields share a semantic name.
    #[error("field '{field}' is declared twice")]
    DuplicateField { field: String },
    /// A radio group with no options can never produce a payload.
    #[error("radio group '{field}' has no options")]
    EmptyRadioGroup { field: String },
    /// A radio group's fallback tag must be one of its options.
    #[error("radio group '{field}' falls back to unknown tag '{fallback}'")]
    UnknownFallback { field: String, fallback: String },
}

/// One option of a radio-group field: a UI tag backed by a boolean wire
/// property, or an unbacked tag that storage represents as every backed
/// member of the group being false (the ask-password email link works this
/// way).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioOption {
    /// Tag shown to and selected by the operator (e.g. `"sms-otp"`)
    pub tag: String,
    /// Boolean wire property this option maps onto, if any
    pub property: Option<String>,
}

impl RadioOption {
    pub fn new(tag: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            property: Some(property.into()),
        }
    }

    /// An option with no wire property of its own. It is selected when no
    /// backed option in the group is truthy, and selecting it serializes
    /// every backed member to `"false"`.
    pub fn unbacked(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            property: None,
        }
    }
}

/// The shape of one semantic form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Checkbox backed by one boolean property
    Toggle { property: String },
    /// Integer-valued property; the form keeps the original string and the
    /// constraints are applied at validation time. When `zero_default` is
    /// set, a reconciled value of numeric zero is replaced by it — the
    /// backend treats `"0"` as distinct from "disabled" for these fields, so
    /// an ambiguous zero must never be submitted.
    Number {
        property: String,
        constraints: ValueConstraints,
        zero_default: Option<i64>,
    },
    /// Free-text property
    Text {
        property: String,
        constraints: ValueConstraints,
    },
    /// One choice over N mutually-exclusive boolean properties. `options`
    /// order is the resolution priority when storage holds more than one
    /// flag truthy; it is a per-connector business rule, not incidental.
    RadioGroup {
        options: Vec<RadioOption>,
        fallback: String,
    },
}

/// One semantic form field and its wire mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Semantic field name (e.g. `"maxFailedAttempts"`)
    pub name: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn toggle(name: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Toggle {
                property: property.into(),
            },
        }
    }

    pub fn number(name: impl Into<String>, property: impl Into<String>, constraints: ValueConstraints) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Number {
                property: property.into(),
                constraints,
                zero_default: None,
            },
        }
    }

    /// A number field whose reconciled zero is replaced by `default`.
    pub fn number_with_zero_default(
        name: impl Into<String>,
        property: impl Into<String>,
        constraints: ValueConstraints,
        default: i64,
    ) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Number {
                property: property.into(),
                constraints,
                zero_default: Some(default),
            },
        }
    }

    pub fn text(name: impl Into<String>, property: impl Into<String>, constraints: ValueConstraints) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Text {
                property: property.into(),
                constraints,
            },
        }
    }

    pub fn radio_group(name: impl Into<String>, options: Vec<RadioOption>, fallback: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::RadioGroup {
                options,
                fallback: fallback.into(),
            },
        }
    }

    /// Every wire property this field reads or writes.
    pub fn property_names(&self) -> Vec<&str> {
        match &self.kind {
            FieldKind::Toggle { property }
            | FieldKind::Number { property, .. }
            | FieldKind::Text { property, .. } => vec![property.as_str()],
            FieldKind::RadioGroup { options, .. } => {
                options.iter().filter_map(|option| option.property.as_deref()).collect()
            }
        }
    }
}

/// The declarative projection for one governance connector: which wire
/// properties it exposes as which typed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSpec {
    /// Canonical connector name (e.g. `"account.lock.handler"`)
    pub connector: String,
    /// Category identifier used in API paths
    pub category_id: String,
    /// Connector identifier used in API paths
    pub connector_id: String,
    pub fields: Vec<FieldSpec>,
}

impl ProjectionSpec {
    /// Check the structural invariants: unique field names, unique wire
    /// properties across fields, non-empty radio groups with a known
    /// fallback tag.
    pub fn validate(&self) -> Result<(), ProjectionError> {
        let mut property_owner: IndexMap<&str, &str> = IndexMap::new();
        let mut field_names: IndexMap<&str, ()> = IndexMap::new();

        for field in &self.fields {
            if field_names.insert(field.name.as_str(), ()).is_some() {
                return Err(ProjectionError::DuplicateField {
                    field: field.name.clone(),
                });
            }

            if let FieldKind::RadioGroup { options, fallback } = &field.kind {
                if options.is_empty() {
                    return Err(ProjectionError::EmptyRadioGroup {
                        field: field.name.clone(),
                    });
                }
                if !options.iter().any(|option| option.tag == *fallback) {
                    return Err(ProjectionError::UnknownFallback {
                        field: field.name.clone(),
                        fallback: fallback.clone(),
                    });
                }
            }

            for property in field.property_names() {
                if let Some(first_field) = property_owner.insert(property, field.name.as_str())
                    && first_field != field.name
                {
                    return Err(ProjectionError::DuplicateProperty {
                        property: property.to_string(),
                        first_field: first_field.to_string(),
                        second_field: field.name.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Projection specs keyed by canonical connector name.
#[derive(Debug, Clone, Default)]
pub struct ProjectionRegistry {
    specs: IndexMap<String, ProjectionSpec>,
}

static BUILTIN: Lazy<ProjectionRegistry> = Lazy::new(|| {
    let mut registry = ProjectionRegistry::default();
    for spec in connectors::builtin_projections() {
        registry
            .insert(spec)
            .expect("built-in projections pass validation");
    }
    registry
});

impl ProjectionRegistry {
    /// The projections for the stock governance connectors.
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Insert a projection after checking its invariants.
    pub fn insert(&mut self, spec: ProjectionSpec) -> Result<(), ProjectionError> {
        spec.validate()?;
        self.specs.insert(spec.connector.clone(), spec);
        Ok(())
    }

    /// Look up a projection by canonical connector name.
    pub fn find(&self, connector: &str) -> Option<&ProjectionSpec> {
        self.specs.get(connector)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectionSpec> {
        self.specs.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_with_fields(fields: Vec<FieldSpec>) -> ProjectionSpec {
        ProjectionSpec {
            connector: "test.connector".into(),
            category_id: "category".into(),
            connector_id: "connector".into(),
            fields,
        }
    }

    #[test]
    fn duplicate_wire_property_across_fields_rejects() {
        let spec = spec_with_fields(vec![
            FieldSpec::toggle("enable", "Test.Enable"),
            FieldSpec::toggle("enableAgain", "Test.Enable"),
        ]);

        let error = spec.validate().expect_err("duplicate property must be rejected");
        assert!(matches!(error, ProjectionError::DuplicateProperty { .. }));
    }

    #[test]
    fn radio_option_clashing_with_scalar_field_rejects() {
        let spec = spec_with_fields(vec![
            FieldSpec::toggle("smsEnabled", "Test.Sms.Enable"),
            FieldSpec::radio_group(
                "channel",
                vec![
                    RadioOption::new("sms", "Test.Sms.Enable"),
                    RadioOption::new("email", "Test.Email.Enable"),
                ],
                "email",
            ),
        ]);

        assert!(spec.validate().is_err());
    }

    #[test]
    fn fallback_must_name_an_option() {
        let spec = spec_with_fields(vec![FieldSpec::radio_group(
            "channel",
            vec![RadioOption::new("sms", "Test.Sms.Enable")],
            "email",
        )]);

        let error = spec.validate().expect_err("unknown fallback must be rejected");
        assert!(matches!(error, ProjectionError::UnknownFallback { .. }));
    }

    #[test]
    fn well_formed_spec_passes_and_registers() {
        let spec = spec_with_fields(vec![
            FieldSpec::toggle("notifySuccess", "Test.NotifySuccess"),
            FieldSpec::number(
                "expiryTime",
                "Test.ExpiryTime",
                ValueConstraints::required_integer(1, 10080),
            ),
        ]);

        let mut registry = ProjectionRegistry::default();
        registry.insert(spec).expect("valid spec inserts");
        assert!(registry.find("test.connector").is_some());
    }
}
