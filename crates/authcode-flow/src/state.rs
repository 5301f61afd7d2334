//! Protected state codec and CSRF correlation guard.
//!
//! Flow context survives the redirect round-trip entirely inside the
//! `state` query parameter: the codec wraps [`AuthProperties`] in an
//! HS256-signed, expiring token, and the guard stamps a keyed nonce into
//! the properties before they are protected. Neither keeps any
//! server-side record of the flow.

use crate::error::FlowResult;
use authcode_core::AuthProperties;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::{Rng, thread_rng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct StateClaims {
    iat: i64,
    exp: i64,
    props: AuthProperties,
}

/// Serializes [`AuthProperties`] into a forgery-resistant `state` token
/// and back.
pub struct StateCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    validation: Validation,
}

impl StateCodec {
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_seconds as i64),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn protect(&self, properties: &AuthProperties) -> FlowResult<String> {
        let now = Utc::now();
        let claims = StateClaims {
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            props: properties.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Reverses [`StateCodec::protect`]. Returns `None` when the token is
    /// missing, malformed, expired, or fails integrity verification;
    /// callers must abort the flow on `None`, never treat it as
    /// authenticated.
    pub fn unprotect(&self, token: &str) -> Option<AuthProperties> {
        if token.is_empty() {
            return None;
        }

        match decode::<StateClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims.props),
            Err(err) => {
                debug!(error = %err, "state token failed verification");
                None
            }
        }
    }
}

/// Generates and validates the per-flow correlation nonce.
///
/// The nonce is self-authenticating: a random part paired with a keyed
/// SHA-256 tag, so validation needs no record of issued nonces. It
/// travels only inside the protected state, never as a separate cookie.
pub struct CorrelationGuard {
    key: Vec<u8>,
}

impl CorrelationGuard {
    pub fn new(secret: &str) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
        }
    }

    /// Writes a fresh nonce into the properties before they are protected
    /// and sent out on the challenge leg.
    pub fn generate_correlation_id(&self, properties: &mut AuthProperties) {
        let mut rng = thread_rng();
        let bytes: Vec<u8> = (0..16).map(|_| rng.r#gen::<u8>()).collect();
        let random = URL_SAFE_NO_PAD.encode(bytes);
        let tag = self.tag(&random);

        properties.set_correlation_id(format!("{random}.{tag}"));
    }

    /// Confirms the nonce carried by the properties was minted under this
    /// guard's key. False on absence, malformed nonce, or tag mismatch.
    pub fn validate_correlation_id(&self, properties: &AuthProperties) -> bool {
        let Some(nonce) = properties.correlation_id() else {
            return false;
        };
        let Some((random, tag)) = nonce.split_once('.') else {
            return false;
        };

        self.tag(random) == tag
    }

    fn tag(&self, random: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.key);
        hasher.update(random.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}
