//! Flow configuration types.

use serde::{Deserialize, Serialize};

/// Scope requested when the caller supplies none.
pub const DEFAULT_SCOPE: &str = "AaaServer.profile.Read";

/// Mapping from provider-specific profile field names to the normalized
/// identity record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileMapping {
    pub id_field: String,
    pub email_field: String,
    pub first_name_field: String,
    pub last_name_field: String,
}

impl Default for ProfileMapping {
    fn default() -> Self {
        Self {
            id_field: "sub".to_string(),
            email_field: "email".to_string(),
            first_name_field: "given_name".to_string(),
            last_name_field: "family_name".to_string(),
        }
    }
}

/// Configuration consumed by [`crate::AuthorizationCodeFlow`].
#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    /// Profile endpoint queried with the exchanged bearer token.
    pub profile_endpoint: Option<String>,
    /// Explicit toggle for the profile fetch; when false only token
    /// fields populate the identity.
    pub fetch_profile: bool,
    /// Inbound path the controller claims; requests elsewhere pass through.
    pub callback_path: String,
    /// Ordered scope list, space-joined on the wire.
    pub scopes: Vec<String>,
    /// Optional provider hint (`access_type=offline` and friends).
    pub access_type: Option<String>,
    /// Key material protecting the `state` parameter.
    pub state_secret: String,
    /// Lifetime of a protected state blob.
    pub state_ttl_seconds: u64,
    pub http_timeout_seconds: u64,
    pub profile_mapping: ProfileMapping,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            authorization_endpoint: String::new(),
            token_endpoint: String::new(),
            profile_endpoint: None,
            fetch_profile: false,
            callback_path: "/signin-oauth".to_string(),
            scopes: Vec::new(),
            access_type: None,
            state_secret: String::new(),
            state_ttl_seconds: 600, // 10 minutes
            http_timeout_seconds: 30,
            profile_mapping: ProfileMapping::default(),
        }
    }
}

impl FlowConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        authorization_endpoint: impl Into<String>,
        token_endpoint: impl Into<String>,
        state_secret: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authorization_endpoint: authorization_endpoint.into(),
            token_endpoint: token_endpoint.into(),
            state_secret: state_secret.into(),
            ..Self::default()
        }
    }

    pub fn with_callback_path(mut self, path: impl Into<String>) -> Self {
        self.callback_path = path.into();
        self
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_access_type(mut self, access_type: impl Into<String>) -> Self {
        self.access_type = Some(access_type.into());
        self
    }

    pub fn with_profile_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.profile_endpoint = Some(endpoint.into());
        self.fetch_profile = true;
        self
    }

    pub fn with_profile_mapping(mut self, mapping: ProfileMapping) -> Self {
        self.profile_mapping = mapping;
        self
    }

    pub fn with_state_ttl(mut self, seconds: u64) -> Self {
        self.state_ttl_seconds = seconds;
        self
    }

    pub fn with_http_timeout(mut self, seconds: u64) -> Self {
        self.http_timeout_seconds = seconds;
        self
    }

    /// Checks invariants the rest of the flow relies on.
    pub fn validate(&self) -> Result<(), String> {
        if self.client_id.is_empty() {
            return Err("client_id must not be empty".to_string());
        }
        if self.client_secret.is_empty() {
            return Err("client_secret must not be empty".to_string());
        }
        if self.state_secret.is_empty() {
            return Err("state_secret must not be empty".to_string());
        }
        if !self.callback_path.starts_with('/') {
            return Err("callback_path must start with '/'".to_string());
        }
        if self.fetch_profile && self.profile_endpoint.is_none() {
            return Err("fetch_profile requires a profile_endpoint".to_string());
        }
        Ok(())
    }
}
