//! Normalization of provider responses into an [`Identity`].

use crate::config::ProfileMapping;
use crate::types::TokenResponse;
use authcode_core::Identity;

/// Builds the normalized identity from the token response and, when the
/// provider integration supports it, a profile payload.
///
/// Degrades gracefully: a missing profile field leaves its slot empty,
/// and an unparsable `expires_in` leaves the expiry unset. A minimal
/// identity carrying only the tokens is still useful to the host.
pub fn normalize_identity(
    tokens: &TokenResponse,
    profile: Option<&serde_json::Value>,
    mapping: &ProfileMapping,
) -> Identity {
    let field = |name: &str| -> Option<String> {
        profile
            .and_then(|p| p.get(name))
            .and_then(|v| v.as_str())
            .map(String::from)
    };

    Identity {
        user_id: field(&mapping.id_field),
        email: field(&mapping.email_field),
        first_name: field(&mapping.first_name_field),
        last_name: field(&mapping.last_name_field),
        access_token: tokens.access_token.clone(),
        refresh_token: tokens.refresh_token.clone(),
        expires_in: tokens
            .expires_in
            .as_deref()
            .and_then(|raw| raw.parse::<i64>().ok()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> TokenResponse {
        TokenResponse {
            access_token: "tok".to_string(),
            expires_in: Some("3600".to_string()),
            refresh_token: Some("ref".to_string()),
        }
    }

    #[test]
    fn maps_profile_fields_through_configured_names() {
        let mapping = ProfileMapping {
            id_field: "openID".to_string(),
            email_field: "email".to_string(),
            first_name_field: "givenName".to_string(),
            last_name_field: "surname".to_string(),
        };
        let profile = serde_json::json!({
            "openID": "u-42",
            "email": "user@example.com",
            "givenName": "First",
            "surname": "Last",
        });

        let identity = normalize_identity(&tokens(), Some(&profile), &mapping);
        assert_eq!(identity.user_id.as_deref(), Some("u-42"));
        assert_eq!(identity.email.as_deref(), Some("user@example.com"));
        assert_eq!(identity.first_name.as_deref(), Some("First"));
        assert_eq!(identity.last_name.as_deref(), Some("Last"));
        assert_eq!(identity.access_token, "tok");
        assert_eq!(identity.refresh_token.as_deref(), Some("ref"));
        assert_eq!(identity.expires_in, Some(3600));
    }

    #[test]
    fn missing_profile_fields_leave_slots_empty() {
        let profile = serde_json::json!({ "sub": "u-1" });

        let identity = normalize_identity(&tokens(), Some(&profile), &ProfileMapping::default());
        assert_eq!(identity.user_id.as_deref(), Some("u-1"));
        assert!(identity.email.is_none());
        assert!(identity.first_name.is_none());
        assert!(identity.last_name.is_none());
    }

    #[test]
    fn no_profile_yields_token_only_identity() {
        let identity = normalize_identity(&tokens(), None, &ProfileMapping::default());
        assert!(identity.user_id.is_none());
        assert_eq!(identity.access_token, "tok");
        assert_eq!(identity.expires_in, Some(3600));
    }

    #[test]
    fn unparsable_expires_in_leaves_expiry_unset() {
        let mut t = tokens();
        t.expires_in = Some("soon".to_string());
        let identity = normalize_identity(&t, None, &ProfileMapping::default());
        assert!(identity.expires_in.is_none());

        t.expires_in = None;
        let identity = normalize_identity(&t, None, &ProfileMapping::default());
        assert!(identity.expires_in.is_none());
    }
}
