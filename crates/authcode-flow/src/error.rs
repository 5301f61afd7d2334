//! Flow error types.

use thiserror::Error;

pub type FlowResult<T> = Result<T, FlowError>;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),

    #[error("Profile request failed: {0}")]
    ProfileRequestFailed(String),

    #[error("State protection error: {0}")]
    StateProtection(#[from] jsonwebtoken::errors::Error),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Event handler error: {0}")]
    EventError(#[from] authcode_core::EventError),
}
