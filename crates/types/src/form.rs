//! Typed form state derived from a property catalog.
//!
//! A [`FormState`] exists only for the lifetime of one edit session. It is
//! rebuilt from scratch whenever a new catalog is fetched; local edits are
//! never trusted across a reload.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub mod validation;

pub use validation::ValueConstraints;

/// A typed value held by one semantic form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormValue {
    /// Checkbox-style boolean field
    Bool(bool),
    /// Free-text or numeric field; integers stay in their original string
    /// form until validation/submit time
    Text(String),
    /// The selected tag of a radio-group field
    Choice(String),
}

impl FormValue {
    /// Serialize to the string wire form expected by the configuration API.
    pub fn to_wire(&self) -> String {
        match self {
            FormValue::Bool(value) => value.to_string(),
            FormValue::Text(text) => text.clone(),
            FormValue::Choice(tag) => tag.clone(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FormValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<&str> {
        match self {
            FormValue::Choice(tag) => Some(tag),
            _ => None,
        }
    }
}

/// Mapping from semantic field name to its current typed value.
///
/// Fields whose backing property was absent from the catalog are simply not
/// present; consumers supply their own UI-level defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    fields: IndexMap<String, FormValue>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&FormValue> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: FormValue) {
        self.fields.insert(field.into(), value);
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FormValue)> {
        self.fields.iter()
    }

    /// The string content of a text field, treating a missing field as empty.
    /// Used by validation, where "not filled in" and "cleared" are the same.
    pub fn text_or_empty(&self, field: &str) -> &str {
        self.get(field).and_then(FormValue::as_text).unwrap_or("")
    }
}

impl FromIterator<(String, FormValue)> for FormState {
    fn from_iter<T: IntoIterator<Item = (String, FormValue)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Per-field validation messages.
///
/// A field with no entry is valid; a form is submittable only when the map is
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    errors: IndexMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(field.into(), message.into());
    }

    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.errors.iter()
    }
}
