//! The flow controller: orchestrates the challenge and callback legs.

use crate::authorize::build_authorization_url;
use crate::client::OAuth2Client;
use crate::config::FlowConfig;
use crate::error::{FlowError, FlowResult};
use crate::identity::normalize_identity;
use crate::state::{CorrelationGuard, StateCodec};
use crate::types::{CallbackAction, ChallengeOutcome, IncomingRequest};
use authcode_core::{
    AuthProperties, AuthenticationTicket, FlowEvents, RedirectContext, ReturnContext,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Drives the authorization-code grant across its two HTTP legs.
///
/// Holds no cross-request mutable state: everything a callback needs is
/// recovered from the protected `state` parameter, so instances can be
/// shared freely across concurrent requests and replicas.
pub struct AuthorizationCodeFlow {
    config: FlowConfig,
    codec: StateCodec,
    guard: CorrelationGuard,
    client: OAuth2Client,
    events: Arc<dyn FlowEvents>,
}

impl AuthorizationCodeFlow {
    pub fn new(config: FlowConfig, events: Arc<dyn FlowEvents>) -> FlowResult<Self> {
        config.validate().map_err(FlowError::Config)?;

        let codec = StateCodec::new(&config.state_secret, config.state_ttl_seconds);
        let guard = CorrelationGuard::new(&config.state_secret);
        let client = OAuth2Client::new(config.http_timeout_seconds)?;

        Ok(Self {
            config,
            codec,
            guard,
            client,
            events,
        })
    }

    /// Challenge leg: issue the redirect that sends the user agent to the
    /// provider's authorization endpoint.
    ///
    /// When the caller left no redirect target in the properties, the
    /// current request URL becomes the post-login destination.
    pub async fn challenge(
        &self,
        request: &IncomingRequest,
        mut properties: AuthProperties,
    ) -> FlowResult<ChallengeOutcome> {
        if properties.redirect_uri().is_none() {
            properties.set_redirect_uri(request.uri());
        }

        self.guard.generate_correlation_id(&mut properties);
        self.events.on_before_redirect(&mut properties).await;

        let state = self.codec.protect(&properties)?;
        let location = build_authorization_url(
            &self.config.authorization_endpoint,
            &self.config.client_id,
            &self.callback_redirect_uri(request),
            &self.config.scopes,
            self.config.access_type.as_deref(),
            &state,
        )?;

        debug!("issuing authorization challenge redirect");

        let mut redirect = RedirectContext::new(location, properties);
        self.events.on_apply_redirect(&mut redirect).await;

        if redirect.is_handled() {
            Ok(ChallengeOutcome::Handled)
        } else {
            Ok(ChallengeOutcome::Redirect(redirect.location))
        }
    }

    /// Callback leg: `None` when the request is not for the configured
    /// callback path and the controller does not participate at all.
    ///
    /// Every failure inside callback processing is caught here and turned
    /// into a terminal action; the host never sees a propagated error
    /// from this subsystem.
    pub async fn handle_callback(&self, request: &IncomingRequest) -> Option<CallbackAction> {
        if request.path != self.config.callback_path {
            return None;
        }

        let ticket = match self.authenticate(request).await {
            Ok(ticket) => ticket,
            Err(err) => {
                error!(error = %err, "callback processing failed");
                None
            }
        };

        let mut context = ReturnContext::new(ticket);
        if let Err(err) = self.events.on_return_endpoint(&mut context).await {
            error!(error = %err, "return endpoint hook failed");
            return Some(CallbackAction::Failure);
        }

        if context.is_handled() {
            return Some(CallbackAction::Handled);
        }

        let Some(ticket) = context.ticket else {
            return Some(CallbackAction::Failure);
        };

        match context.redirect_uri {
            Some(location) if ticket.identity.is_none() => {
                Some(CallbackAction::Redirect(append_access_denied(&location)))
            }
            Some(location) => Some(CallbackAction::Redirect(location)),
            // Nothing to redirect to; the response is the host's problem.
            None => Some(CallbackAction::Handled),
        }
    }

    /// Runs the callback state machine up to a ticket (or its absence).
    ///
    /// `Ok(None)` means no ticket can exist for this request: the state
    /// parameter was missing, repeated, or failed integrity verification.
    async fn authenticate(
        &self,
        request: &IncomingRequest,
    ) -> FlowResult<Option<AuthenticationTicket>> {
        let Some(state) = request.single_query_value("state") else {
            warn!("callback state parameter missing or repeated");
            return Ok(None);
        };

        let Some(properties) = self.codec.unprotect(state) else {
            warn!("callback state failed unprotection");
            return Ok(None);
        };

        if let Some(error) = request.single_query_value("error") {
            info!(error, "provider denied the authorization request");
            return Ok(Some(AuthenticationTicket::anonymous(properties)));
        }

        let Some(code) = request.single_query_value("code") else {
            warn!("callback carried no usable authorization code");
            return Ok(Some(AuthenticationTicket::anonymous(properties)));
        };

        if !self.guard.validate_correlation_id(&properties) {
            warn!("correlation validation failed, treating callback as forged");
            return Ok(Some(AuthenticationTicket::anonymous(properties)));
        }

        // Must match the redirect_uri sent on the challenge leg exactly.
        let redirect_uri = self.callback_redirect_uri(request);
        let tokens = self.client.exchange_code(&self.config, code, &redirect_uri).await?;

        let profile = match (self.config.fetch_profile, &self.config.profile_endpoint) {
            (true, Some(endpoint)) => Some(
                self.client
                    .fetch_profile(endpoint, &tokens.access_token)
                    .await?,
            ),
            _ => None,
        };

        let identity = normalize_identity(&tokens, profile.as_ref(), &self.config.profile_mapping);

        let mut ticket = AuthenticationTicket::new(identity, properties);
        self.events.on_authenticated(&mut ticket).await?;

        info!("callback completed, authentication ticket produced");
        Ok(Some(ticket))
    }

    /// Reconstructs the exact redirect URI registered with the provider:
    /// scheme + host + base path + callback path.
    fn callback_redirect_uri(&self, request: &IncomingRequest) -> String {
        format!(
            "{}://{}{}{}",
            request.scheme, request.host, request.path_base, self.config.callback_path
        )
    }
}

/// Appends the `error=access_denied` hint to a redirect target that may
/// be a relative path, which `url::Url` cannot represent on its own.
fn append_access_denied(location: &str) -> String {
    let separator = if location.contains('?') { '&' } else { '?' };
    format!("{location}{separator}error=access_denied")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_denied_hint_respects_existing_query() {
        assert_eq!(
            append_access_denied("https://app/home"),
            "https://app/home?error=access_denied"
        );
        assert_eq!(
            append_access_denied("/home?tab=1"),
            "/home?tab=1&error=access_denied"
        );
    }
}
