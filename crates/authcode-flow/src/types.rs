//! Wire and boundary types exchanged with the hosting environment.

use serde::{Deserialize, Serialize};

/// Token endpoint response, as extracted from the provider's JSON body.
///
/// `expires_in` is kept raw; providers disagree on whether it is a JSON
/// number or a string, so the identity normalizer does the base-10 parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<String>,
    pub refresh_token: Option<String>,
}

/// Minimal view of an inbound HTTP request, supplied by the host.
///
/// `query` preserves duplicate parameters; the flow requires exactly one
/// occurrence of the parameters it consumes.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub scheme: String,
    /// Host, including a non-default port.
    pub host: String,
    /// Prefix the host mounts the application under; empty when at root.
    pub path_base: String,
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl IncomingRequest {
    pub fn new(
        scheme: impl Into<String>,
        host: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            path_base: String::new(),
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn with_path_base(mut self, path_base: impl Into<String>) -> Self {
        self.path_base = path_base.into();
        self
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Parses a raw query string, preserving duplicates.
    pub fn with_query_string(mut self, raw: &str) -> Self {
        self.query = url::form_urlencoded::parse(raw.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        self
    }

    /// Full request URL, used as the default post-login redirect target.
    pub fn uri(&self) -> String {
        let mut uri = format!("{}://{}{}{}", self.scheme, self.host, self.path_base, self.path);
        if !self.query.is_empty() {
            let encoded: String = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .finish();
            uri.push('?');
            uri.push_str(&encoded);
        }
        uri
    }

    /// Returns the value of `name` only when it occurs exactly once.
    /// Repeated parameters are treated as not usable.
    pub fn single_query_value(&self, name: &str) -> Option<&str> {
        let mut values = self
            .query
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str());

        let first = values.next()?;
        if values.next().is_some() {
            return None;
        }
        Some(first)
    }
}

/// Result of the challenge leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// Redirect the user agent to the authorization endpoint.
    Redirect(String),
    /// A host hook already wrote the response.
    Handled,
}

/// Result of the callback leg, once the controller decided to participate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// Redirect the user agent to the post-login destination.
    Redirect(String),
    /// A host hook already wrote the response.
    Handled,
    /// No ticket could be produced; the host should answer with a
    /// generic failure and let the user retry the login.
    Failure,
}
