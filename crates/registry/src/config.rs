//! Per-deployment console configuration.
//!
//! The original console steered per-deployment behavior through an open-ended
//! module-scope object; here the schema is fixed and explicit. The file lives
//! in the platform config directory (`~/.config/govctl/console.json` on most
//! platforms) and falls back to defaults when absent or unparsable.

use std::{env, io::Error, path::PathBuf};

use dirs_next::config_dir;
use govctl_util::expand_tilde;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::connectors;

/// Environment variable allowing callers to override the config file path.
pub const CONFIG_PATH_ENV: &str = "GOVCTL_CONFIG_PATH";

/// Default filename for the JSON payload.
pub const CONFIG_FILE_NAME: &str = "console.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsoleConfig {
    /// Base URL override for the configuration API
    pub base_url: Option<String>,
    /// Canonical names of connectors hidden from this deployment
    pub hidden_connectors: Vec<String>,
    /// Per-connector lists of disabled form features (semantic field names)
    pub disabled_features: IndexMap<String, Vec<String>>,
    /// Submit the connector's toggle property as enabled alongside form
    /// updates
    pub auto_enable_connector_toggle: bool,
    /// Enable/disable toggle property per canonical connector name
    pub connector_toggles: IndexMap<String, String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let mut connector_toggles = IndexMap::new();
        connector_toggles.insert(
            connectors::LOGIN_ATTEMPT_SECURITY_CONNECTOR.to_string(),
            connectors::ACCOUNT_LOCK_ENABLE.to_string(),
        );
        connector_toggles.insert(
            connectors::BOT_DETECTION_CONNECTOR.to_string(),
            connectors::BOT_DETECTION_ENABLE.to_string(),
        );
        connector_toggles.insert(
            connectors::SELF_REGISTRATION_CONNECTOR.to_string(),
            connectors::SELF_REGISTRATION_ENABLE.to_string(),
        );
        connector_toggles.insert(
            connectors::PASSWORD_RECOVERY_CONNECTOR.to_string(),
            connectors::PASSWORD_RECOVERY_ENABLE.to_string(),
        );
        connector_toggles.insert(
            connectors::ASK_PASSWORD_CONNECTOR.to_string(),
            connectors::ASK_PASSWORD_ENABLE.to_string(),
        );

        Self {
            base_url: None,
            hidden_connectors: Vec::new(),
            disabled_features: IndexMap::new(),
            auto_enable_connector_toggle: true,
            connector_toggles,
        }
    }
}

impl ConsoleConfig {
    /// Load the deployment config, falling back to defaults when the file is
    /// absent or does not parse.
    pub fn load() -> Self {
        let path = default_config_path();
        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(error) => {
                    warn!(path = %path.display(), error = %error, "Failed to parse console config; using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Write the config as pretty JSON to the default path, creating parent
    /// directories as needed.
    pub fn save(&self) -> Result<(), Error> {
        let path = default_config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    pub fn is_connector_hidden(&self, connector: &str) -> bool {
        self.hidden_connectors.iter().any(|hidden| hidden == connector)
    }

    pub fn is_feature_disabled(&self, connector: &str, feature: &str) -> bool {
        self.disabled_features
            .get(connector)
            .is_some_and(|features| features.iter().any(|disabled| disabled == feature))
    }

    /// The enable/disable toggle property configured for a connector.
    pub fn toggle_property(&self, connector: &str) -> Option<&str> {
        self.connector_toggles.get(connector).map(String::as_str)
    }
}

/// Get the default path for the console configuration file.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("govctl")
        .join(CONFIG_FILE_NAME)
}
