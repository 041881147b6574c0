//! Governance-connector API client.
//!
//! This module provides a lightweight client for the remote configuration
//! API. It focuses on:
//!
//! - Constructing an HTTP client with sensible defaults
//! - Discovering credentials from `GOVCTL_API_TOKEN`
//! - Validating `GOVCTL_API_BASE` for safety
//! - Fetching, updating, and reverting connector configurations
//!
//! The primary entry point is [`ConsoleClient`]. Create an instance via
//! [`ConsoleClient::new_from_env`], then call the typed operations
//! ([`ConsoleClient::fetch_connector`], [`ConsoleClient::update_connector`],
//! ...). All persistence lives behind the remote API; the client holds no
//! state beyond its configuration.

use std::env;
use std::time::Duration;

use govctl_types::{ConnectorCategory, GovernanceConnector, UpdatePayload};
use reqwest::{Client, RequestBuilder, StatusCode, Url, header};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

/// Default base URL of a locally running identity server.
const DEFAULT_API_BASE: &str = "https://localhost:9443";

/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Errors surfaced by gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Client-side misconfiguration (bad base URL, malformed header value).
    #[error("gateway configuration error: {0}")]
    Config(String),
    /// Connection-level failure: DNS, TLS, timeout, refused.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Non-2xx response. `detail` carries the structured error description
    /// from the response body when the server provided one.
    #[error("HTTP {status}: {}", detail.as_deref().unwrap_or("no detail provided"))]
    Http {
        status: StatusCode,
        detail: Option<String>,
    },
    /// 2xx response whose body did not decode into the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GatewayError {
    /// The structured server-provided error description, when one exists.
    /// Callers use its absence to pick a generic fallback alert.
    pub fn detail(&self) -> Option<&str> {
        match self {
            GatewayError::Http { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// Thin wrapper around a configured `reqwest::Client` for the governance
/// connector configuration API.
///
/// The client pre-configures default headers and builds requests against a
/// validated base URL. Authentication is read from the environment.
#[derive(Debug, Clone)]
pub struct ConsoleClient {
    pub base_url: String,
    pub http: Client,
    pub user_agent: String,
}

impl ConsoleClient {
    /// Construct a [`ConsoleClient`] from environment variables.
    ///
    /// The bearer token is taken from `GOVCTL_API_TOKEN` when set. The base
    /// URL is taken from `GOVCTL_API_BASE` (if set) or falls back to the
    /// local development server. Non-localhost hosts must use HTTPS.
    pub fn new_from_env() -> Result<Self, GatewayError> {
        let base_url = env::var("GOVCTL_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into());
        Self::new_with_base(&base_url)
    }

    /// Construct a client against an explicit base URL, keeping token
    /// discovery from the environment.
    pub fn new_with_base(base_url: &str) -> Result<Self, GatewayError> {
        validate_base_url(base_url)?;

        let mut default_headers = header::HeaderMap::new();
        if let Ok(api_token) = env::var("GOVCTL_API_TOKEN") {
            let authorization = format!("Bearer {}", api_token);
            let value = header::HeaderValue::from_str(&authorization)
                .map_err(|_| GatewayError::Config("GOVCTL_API_TOKEN contains invalid header characters".into()))?;
            default_headers.insert(header::AUTHORIZATION, value);
        }
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            user_agent: format!("govctl/0.1; {}", env::consts::OS),
        })
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "building request");

        self.http
            .request(method, url)
            .header(header::USER_AGENT, &self.user_agent)
    }

    /// List every connector category known to the server.
    ///
    /// `GET /governance-connectors`
    pub async fn list_categories(&self) -> Result<Vec<ConnectorCategory>, GatewayError> {
        let response = self
            .request(reqwest::Method::GET, "/governance-connectors")
            .send()
            .await?;
        let body = read_success_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch one connector's property catalog.
    ///
    /// `GET /governance-connectors/{category}/connectors/{connector}`
    pub async fn fetch_connector(
        &self,
        category_id: &str,
        connector_id: &str,
    ) -> Result<GovernanceConnector, GatewayError> {
        let path = format!("/governance-connectors/{}/connectors/{}", category_id, connector_id);
        let response = self.request(reqwest::Method::GET, &path).send().await?;
        let body = read_success_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Submit an update payload for one connector.
    ///
    /// `PATCH /governance-connectors/{category}/connectors/{connector}` with
    /// body `{"operation":"UPDATE","properties":[...]}`. Fire-and-forget
    /// from the caller's perspective: a success carries no body worth
    /// inspecting.
    pub async fn update_connector(
        &self,
        category_id: &str,
        connector_id: &str,
        payload: &UpdatePayload,
    ) -> Result<(), GatewayError> {
        let path = format!("/governance-connectors/{}/connectors/{}", category_id, connector_id);
        let response = self.request(reqwest::Method::PATCH, &path).json(payload).send().await?;
        read_success_body(response).await?;
        Ok(())
    }

    /// Reset the named properties of a connector to their system defaults.
    ///
    /// `POST /governance-connectors/{category}/connectors/revert?connectorId=...`
    pub async fn revert_connector(
        &self,
        category_id: &str,
        connector_id: &str,
        property_names: &[String],
    ) -> Result<(), GatewayError> {
        let path = format!("/governance-connectors/{}/connectors/revert", category_id);
        let response = self
            .request(reqwest::Method::POST, &path)
            .query(&[("connectorId", connector_id)])
            .json(&json!({ "properties": property_names }))
            .send()
            .await?;
        read_success_body(response).await?;
        Ok(())
    }
}

/// Read the response body, converting a non-2xx status into
/// [`GatewayError::Http`] with any structured detail the server included.
async fn read_success_body(response: reqwest::Response) -> Result<String, GatewayError> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if !status.is_success() {
        return Err(GatewayError::Http {
            status,
            detail: extract_error_detail(&body),
        });
    }

    Ok(body)
}

/// Pull the human-readable `detail` (preferred) or `description` field out of
/// an error response body, when the body is JSON and carries one.
fn extract_error_detail(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    ["detail", "description"]
        .iter()
        .find_map(|key| parsed.get(key).and_then(Value::as_str))
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: the scheme must be HTTPS
fn validate_base_url(base: &str) -> Result<(), GatewayError> {
    let parsed = Url::parse(base).map_err(|e| GatewayError::Config(format!("invalid base URL '{}': {}", base, e)))?;

    let host_name = parsed
        .host_str()
        .ok_or_else(|| GatewayError::Config("base URL must include a host".into()))?;

    // Local development allowances: localhost/127.0.0.1 with any scheme.
    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed.scheme() != "https" {
        return Err(GatewayError::Config(format!(
            "base URL must use https for non-localhost hosts; got '{}://'",
            parsed.scheme()
        )));
    }

    Ok(())
}
