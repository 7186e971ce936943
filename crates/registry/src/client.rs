//! REST client for the script registry.
//!
//! Covers the two read-only calls the planner needs: the OAuth
//! client-credentials token exchange and the automation script listing.

use serde::Deserialize;

use scriptsync_core::record::ScriptRecord;

use crate::config::RegistryConfig;
use crate::remote;

/// HTTP client for one registry instance.
pub struct RegistryClient {
    client: reqwest::Client,
    config: RegistryConfig,
}

/// Response of `POST /oauth/token`.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Errors from the registry REST layer.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The registry returned a non-2xx status code.
    #[error("Registry API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The token endpoint answered without an access token.
    #[error("Token response did not contain an access_token")]
    MissingToken,
}

impl RegistryClient {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Exchange the configured client credentials for a bearer token.
    pub async fn fetch_token(&self) -> Result<String, RegistryError> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("scope", self.config.scope.as_str()),
        ];

        let response = self
            .client
            .post(format!("{}/oauth/token", self.config.instance_url))
            .form(&form)
            .send()
            .await?;

        let token: TokenResponse = Self::parse_response(response).await?;
        token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(RegistryError::MissingToken)
    }

    /// List all automation scripts, validated into typed records.
    pub async fn list_scripts(&self, token: &str) -> Result<Vec<ScriptRecord>, RegistryError> {
        let response = self
            .client
            .get(format!("{}/v2/automation/scripts", self.config.instance_url))
            .bearer_auth(token)
            .send()
            .await?;

        let raw: Vec<serde_json::Value> = Self::parse_response(response).await?;
        Ok(remote::validate_scripts(raw))
    }

    /// Authenticate and list scripts in one call.
    pub async fn fetch_remote_records(&self) -> Result<Vec<ScriptRecord>, RegistryError> {
        tracing::info!(instance = %self.config.instance_url, "Requesting registry token");
        let token = self.fetch_token().await?;
        let records = self.list_scripts(&token).await?;
        tracing::info!(count = records.len(), "Fetched remote scripts");
        Ok(records)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`RegistryError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, RegistryError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RegistryError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RegistryError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
