//! Server-side OAuth2 authorization-code flow for interactive sign-in.
//!
//! This crate implements the two HTTP legs of the authorization-code
//! grant: the outbound challenge redirect and the inbound callback. All
//! flow context is round-tripped through a tamper-evident `state`
//! parameter, so no server-side session storage is required and the flow
//! is safe under horizontal scaling.

mod authorize;
mod client;
mod config;
mod error;
mod flow;
mod identity;
mod state;
mod types;


pub use authorize::build_authorization_url;
pub use client::OAuth2Client;
pub use config::{DEFAULT_SCOPE, FlowConfig, ProfileMapping};
pub use error::{FlowError, FlowResult};
pub use flow::AuthorizationCodeFlow;
pub use identity::normalize_identity;
pub use state::{CorrelationGuard, StateCodec};
pub use types::{CallbackAction, ChallengeOutcome, IncomingRequest, TokenResponse};

// Re-export the host-facing contract for convenience
pub use authcode_core::{
    AuthProperties, AuthenticationTicket, EventError, FlowEvents, Identity, NoopEvents,
    RedirectContext, ReturnContext,
};
