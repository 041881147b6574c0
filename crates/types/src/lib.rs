use serde::{Deserialize, Serialize};

pub mod form;

pub use form::{FormState, FormValue, ValidationErrors};

/// One named configuration key within a governance connector.
///
/// Values always travel as strings on the wire, even for booleans (`"true"` /
/// `"false"`) and integers (decimal strings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorProperty {
    /// Stable wire identifier, a dotted key (e.g. `"Recovery.ExpiryTime"`)
    pub name: String,
    /// Current value as transmitted by the server
    pub value: String,
    /// Human-readable label supplied by the server
    #[serde(default)]
    pub display_name: String,
    /// Longer help text supplied by the server
    #[serde(default)]
    pub description: String,
}

impl ConnectorProperty {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            display_name: String::new(),
            description: String::new(),
        }
    }
}

/// The property list of one connector, scoped to a `(category, connector)`
/// pair.
///
/// A catalog is produced by a fetch call and replaced wholesale on every
/// re-fetch; the server never sends partial updates. Property names are unique
/// within one catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyCatalog {
    /// Identifier of the owning connector category
    pub category_id: String,
    /// Identifier of the owning connector
    pub connector_id: String,
    /// The unordered property list
    pub properties: Vec<ConnectorProperty>,
}

impl PropertyCatalog {
    pub fn new(category_id: impl Into<String>, connector_id: impl Into<String>) -> Self {
        Self {
            category_id: category_id.into(),
            connector_id: connector_id.into(),
            properties: Vec::new(),
        }
    }

    /// Look up a property by wire name.
    ///
    /// Absence is a first-class case: callers must supply their own fallback
    /// and must never assume a name is present.
    pub fn find(&self, name: &str) -> Option<&ConnectorProperty> {
        self.properties.iter().find(|property| property.name == name)
    }

    /// The raw string value of a property, when present.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.find(name).map(|property| property.value.as_str())
    }

    /// The raw string value of a property, or `fallback` when the name is
    /// absent from the catalog.
    pub fn value_or<'a>(&'a self, name: &str, fallback: &'a str) -> &'a str {
        self.value_of(name).unwrap_or(fallback)
    }
}

/// A governance connector as returned by the configuration API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceConnector {
    /// Opaque identifier used in API paths
    pub id: String,
    /// Canonical connector name (e.g. `"account.lock.handler"`)
    pub name: String,
    /// Display name shown to operators
    #[serde(default)]
    pub friendly_name: String,
    /// Identifier of the category the connector belongs to
    #[serde(default)]
    pub category: String,
    /// Sub-grouping within the category, when the server provides one
    #[serde(default)]
    pub sub_category: String,
    /// Relative ordering hint within the category listing
    #[serde(default)]
    pub order: i64,
    /// The connector's configuration properties
    #[serde(default)]
    pub properties: Vec<ConnectorProperty>,
}

impl GovernanceConnector {
    /// Borrow this connector's properties as a [`PropertyCatalog`] scoped to
    /// the given category.
    pub fn catalog(&self, category_id: &str) -> PropertyCatalog {
        PropertyCatalog {
            category_id: category_id.to_string(),
            connector_id: self.id.clone(),
            properties: self.properties.clone(),
        }
    }
}

/// A grouping of connectors shown together in a listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorCategory {
    /// Opaque identifier used in API paths
    #[serde(default)]
    pub id: String,
    /// Category title (e.g. `"Account Management"`); merge key for listings
    pub title: String,
    /// Connectors belonging to this category
    #[serde(default)]
    pub connectors: Vec<GovernanceConnector>,
}

/// The single patch operation the configuration API understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PatchOperation {
    #[default]
    #[serde(rename = "UPDATE")]
    Update,
}

/// One `{name, value}` pair within an update payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRevision {
    pub name: String,
    pub value: String,
}

impl PropertyRevision {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The body submitted to the connector update endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePayload {
    pub operation: PatchOperation,
    pub properties: Vec<PropertyRevision>,
}

impl UpdatePayload {
    pub fn update(properties: Vec<PropertyRevision>) -> Self {
        Self {
            operation: PatchOperation::Update,
            properties,
        }
    }

    /// The value this payload would write for `name`, when the payload
    /// touches it.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|revision| revision.name == name)
            .map(|revision| revision.value.as_str())
    }
}

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Success,
    Warning,
    Error,
}

/// A one-way user-facing notification.
///
/// Alerts are fire-and-forget: the emitting code never awaits or inspects a
/// response from the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    /// Short headline (e.g. "Update successful")
    pub message: String,
    /// Longer human-readable detail
    pub description: String,
}

impl Alert {
    pub fn new(level: AlertLevel, message: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            description: description.into(),
        }
    }

    pub fn success(message: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(AlertLevel::Success, message, description)
    }

    pub fn error(message: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(AlertLevel::Error, message, description)
    }
}

/// Destination for user-facing alerts.
pub trait AlertSink {
    fn emit(&self, alert: Alert);
}
