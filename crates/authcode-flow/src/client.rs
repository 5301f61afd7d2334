//! Outbound HTTP calls: token exchange and optional profile fetch.

use crate::config::FlowConfig;
use crate::error::{FlowError, FlowResult};
use crate::types::TokenResponse;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info};

/// Server-to-server client for the token and profile endpoints.
///
/// The underlying `reqwest::Client` is shared for connection pooling, but
/// credentials are attached per request; nothing secret is ever written
/// into the shared client's default headers.
#[derive(Clone)]
pub struct OAuth2Client {
    http_client: Client,
}

impl OAuth2Client {
    pub fn new(http_timeout_seconds: u64) -> FlowResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(http_timeout_seconds))
            .build()?;

        Ok(Self { http_client })
    }

    /// Exchanges an authorization code for tokens.
    ///
    /// Any non-success status is fatal for the flow; authorization codes
    /// are single-use, so there is no retry.
    pub async fn exchange_code(
        &self,
        config: &FlowConfig,
        code: &str,
        redirect_uri: &str,
    ) -> FlowResult<TokenResponse> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .http_client
            .post(&config.token_endpoint)
            .basic_auth(&config.client_id, Some(&config.client_secret))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "token exchange failed: {}", error_text);
            return Err(FlowError::TokenExchangeFailed(format!(
                "{status}: {error_text}"
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FlowError::InvalidTokenResponse(e.to_string()))?;

        let access_token = body
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                FlowError::InvalidTokenResponse("access_token missing from response".to_string())
            })?
            .to_string();

        let expires_in = body.get("expires_in").and_then(stringify);
        let refresh_token = body
            .get("refresh_token")
            .and_then(|v| v.as_str())
            .map(String::from);

        info!("successfully exchanged authorization code for tokens");

        Ok(TokenResponse {
            access_token,
            expires_in,
            refresh_token,
        })
    }

    /// Fetches the provider profile with the exchanged bearer token.
    pub async fn fetch_profile(
        &self,
        profile_endpoint: &str,
        access_token: &str,
    ) -> FlowResult<serde_json::Value> {
        let response = self
            .http_client
            .get(profile_endpoint)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "profile request failed: {}", error_text);
            return Err(FlowError::ProfileRequestFailed(format!(
                "{status}: {error_text}"
            )));
        }

        let profile: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FlowError::ProfileRequestFailed(e.to_string()))?;

        debug!("retrieved provider profile");
        Ok(profile)
    }
}

/// Providers send `expires_in` as either a JSON number or a string.
fn stringify(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
