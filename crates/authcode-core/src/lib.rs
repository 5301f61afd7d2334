//! Host-facing contract for the OAuth2 authorization-code sign-in flow.
//!
//! The flow crate drives the protocol; the host plugs in through the
//! [`FlowEvents`] trait and receives an [`AuthenticationTicket`] (or an
//! explicit absence of one) at the end of the callback leg.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Reserved property key for the post-login redirect target.
const REDIRECT_URI_KEY: &str = ".redirect";

/// Reserved property key for the correlation nonce.
const CORRELATION_KEY: &str = ".correlation";

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Authentication rejected: {0}")]
    Rejected(String),

    #[error("Event handler error: {0}")]
    Handler(String),
}

/// Caller-supplied key/value pairs carried across the redirect round-trip.
///
/// Created by the host before the challenge leg, round-tripped opaquely
/// through the protected `state` parameter, and consumed on the callback
/// leg. Never persisted beyond a single flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthProperties {
    items: HashMap<String, String>,
}

impl AuthProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.items.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.items.remove(key)
    }

    pub fn redirect_uri(&self) -> Option<&str> {
        self.get(REDIRECT_URI_KEY)
    }

    pub fn set_redirect_uri(&mut self, uri: impl Into<String>) {
        self.insert(REDIRECT_URI_KEY, uri);
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.get(CORRELATION_KEY)
    }

    pub fn set_correlation_id(&mut self, nonce: impl Into<String>) {
        self.insert(CORRELATION_KEY, nonce);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Normalized identity produced by a successful callback leg.
///
/// Profile-derived fields are best-effort: a provider payload missing a
/// field leaves the slot empty rather than failing the flow, so a minimal
/// identity may carry nothing but the tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds, when the provider reported one.
    pub expires_in: Option<i64>,
}

/// The sole output of the flow: an identity (or its absence) paired with
/// the properties recovered from the protected state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationTicket {
    pub identity: Option<Identity>,
    pub properties: AuthProperties,
}

impl AuthenticationTicket {
    pub fn new(identity: Identity, properties: AuthProperties) -> Self {
        Self {
            identity: Some(identity),
            properties,
        }
    }

    /// Identity-less ticket, the shape delivered when the provider denied
    /// the authorization or correlation validation failed.
    pub fn anonymous(properties: AuthProperties) -> Self {
        Self {
            identity: None,
            properties,
        }
    }
}

/// Context handed to [`FlowEvents::on_apply_redirect`] on the challenge leg.
#[derive(Debug)]
pub struct RedirectContext {
    pub location: String,
    pub properties: AuthProperties,
    handled: bool,
}

impl RedirectContext {
    pub fn new(location: String, properties: AuthProperties) -> Self {
        Self {
            location,
            properties,
            handled: false,
        }
    }

    /// Tell the controller the host issued its own response; the default
    /// redirect is suppressed.
    pub fn mark_handled(&mut self) {
        self.handled = true;
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }
}

/// Context handed to [`FlowEvents::on_return_endpoint`] in every terminal
/// state of the callback leg.
#[derive(Debug)]
pub struct ReturnContext {
    /// `None` is the explicit "no ticket" signal for fatal failures.
    pub ticket: Option<AuthenticationTicket>,
    /// Where the controller will redirect unless the hook overrides it or
    /// marks the response handled.
    pub redirect_uri: Option<String>,
    handled: bool,
}

impl ReturnContext {
    pub fn new(ticket: Option<AuthenticationTicket>) -> Self {
        let redirect_uri = ticket
            .as_ref()
            .and_then(|t| t.properties.redirect_uri())
            .map(str::to_owned);
        Self {
            ticket,
            redirect_uri,
            handled: false,
        }
    }

    pub fn mark_handled(&mut self) {
        self.handled = true;
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }
}

/// Host extensibility points, invoked by the flow controller.
///
/// Every method has a pass-through default, so hosts implement only what
/// they need. Handlers must not panic; failures are reported through
/// [`EventError`] and surface as a callback failure.
#[async_trait]
pub trait FlowEvents: Send + Sync {
    /// Last chance to adjust properties before they are protected and the
    /// challenge redirect is issued.
    async fn on_before_redirect(&self, _properties: &mut AuthProperties) {}

    /// May rewrite the authorize URL or take over the redirect entirely.
    async fn on_apply_redirect(&self, _redirect: &mut RedirectContext) {}

    /// Runs after a successful token exchange, before the ticket becomes
    /// final. Enrich the identity here, or veto by clearing it.
    async fn on_authenticated(
        &self,
        _ticket: &mut AuthenticationTicket,
    ) -> Result<(), EventError> {
        Ok(())
    }

    /// Decides session establishment and the final redirect.
    async fn on_return_endpoint(&self, _context: &mut ReturnContext) -> Result<(), EventError> {
        Ok(())
    }
}

/// Default implementation that accepts every flow untouched.
pub struct NoopEvents;

#[async_trait]
impl FlowEvents for NoopEvents {}
