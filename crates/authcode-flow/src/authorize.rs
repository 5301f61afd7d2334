//! Authorization-endpoint URL construction.

use crate::config::DEFAULT_SCOPE;
use crate::error::FlowResult;
use url::Url;

/// Builds the upstream authorization URL for the challenge redirect.
/// Deterministic given its inputs; no network, no mutable state.
pub fn build_authorization_url(
    authorization_endpoint: &str,
    client_id: &str,
    redirect_uri: &str,
    scopes: &[String],
    access_type: Option<&str>,
    state: &str,
) -> FlowResult<String> {
    let mut url = Url::parse(authorization_endpoint)?;

    let scope = if scopes.is_empty() {
        DEFAULT_SCOPE.to_string()
    } else {
        scopes.join(" ")
    };

    {
        let mut params = url.query_pairs_mut();
        params.append_pair("response_type", "code");
        params.append_pair("client_id", client_id);
        params.append_pair("redirect_uri", redirect_uri);
        params.append_pair("scope", &scope);
        if let Some(access_type) = access_type {
            params.append_pair("access_type", access_type);
        }
        params.append_pair("state", state);
    }

    Ok(url.into())
}
