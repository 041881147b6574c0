//! Canned user-facing alerts for connector operations.
//!
//! Success alerts carry the connector's display name; error alerts prefer
//! the structured detail the server sent over a generic fallback, so a 4xx
//! with a meaningful `detail` surfaces verbatim while a bare network failure
//! still produces something readable.

use govctl_api::GatewayError;
use govctl_types::Alert;

/// Alert for a successful configuration update.
pub fn update_success_alert(connector_name: &str) -> Alert {
    Alert::success(
        "Update successful",
        format!("{connector_name} configuration updated successfully."),
    )
}

/// Alert for a successful revert to server defaults.
pub fn revert_success_alert(connector_name: &str) -> Alert {
    Alert::success(
        "Revert successful",
        format!("{connector_name} configuration reverted to defaults."),
    )
}

/// Alert for a failed configuration update.
pub fn update_error_alert(error: &GatewayError) -> Alert {
    match error.detail() {
        Some(detail) => Alert::error("Update error", detail),
        None => Alert::error(
            "Update error",
            "An error occurred while updating the configuration.",
        ),
    }
}

/// Alert for a failed connector fetch.
pub fn fetch_error_alert(error: &GatewayError) -> Alert {
    match error.detail() {
        Some(detail) => Alert::error("Retrieval error", detail),
        None => Alert::error(
            "Retrieval error",
            "An error occurred while retrieving the configuration.",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use govctl_types::AlertLevel;
    use reqwest::StatusCode;

    #[test]
    fn structured_detail_is_surfaced_verbatim() {
        let error = GatewayError::Http {
            status: StatusCode::BAD_REQUEST,
            detail: Some("Invalid property value for Recovery.ExpiryTime.".into()),
        };

        let alert = update_error_alert(&error);
        assert_eq!(alert.level, AlertLevel::Error);
        assert_eq!(alert.description, "Invalid property value for Recovery.ExpiryTime.");
    }

    #[test]
    fn missing_detail_falls_back_to_a_generic_description() {
        let error = GatewayError::Http {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: None,
        };

        let alert = update_error_alert(&error);
        assert_eq!(alert.description, "An error occurred while updating the configuration.");
    }

    #[test]
    fn success_alert_names_the_connector() {
        let alert = update_success_alert("Account Recovery");
        assert_eq!(alert.level, AlertLevel::Success);
        assert!(alert.description.contains("Account Recovery"));
    }
}
