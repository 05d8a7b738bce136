//! Authorization URL construction for the authorization-code flow
//!
//! The library never calls this URL itself: the application redirects the
//! user's browser to it, and the provider redirects back to `redirect_uri`
//! with a `code` that a `SessionManager` later exchanges for a session.
//!
//! `state` and `nonce` default to fresh random tokens. They are returned with
//! the URL so the application can verify the callback and the ID token.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;
use url::Url;

use crate::credentials::CredentialSet;
use crate::error::{Error, Result};
use crate::scope::ScopeSet;

/// Caller-supplied parts of the authorization URL.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationParams {
    pub scopes: ScopeSet,
    pub purpose: Option<String>,
    pub state: Option<String>,
    pub nonce: Option<String>,
    /// Pre-selects the subject, e.g. `tel:+15551234567` for dev numbers
    pub login_hint: Option<String>,
}

/// A browser authorization URL with the state and nonce embedded in it.
#[derive(Debug, Clone)]
pub struct AuthorizationUrl {
    pub url: String,
    pub state: String,
    pub nonce: String,
}

/// Generate a random URL-safe token for `state` / `nonce`.
///
/// 32 random bytes encoded as URL-safe base64 without padding (43 chars).
pub fn generate_state() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Build `<auth base>/oauth2/auth?client_id&response_type=code&redirect_uri&scope&purpose&state&nonce&max_age=0`.
///
/// `redirect_uri`, `purpose` and `login_hint` are omitted when unset.
pub fn build_authorization_url(
    credentials: &CredentialSet,
    params: AuthorizationParams,
) -> Result<AuthorizationUrl> {
    if credentials.client_id().trim().is_empty() {
        return Err(Error::Configuration(
            "client id is required to build an authorization URL".into(),
        ));
    }

    let mut url = Url::parse(&credentials.authorize_endpoint()).map_err(|e| {
        Error::Configuration(format!(
            "invalid authorization endpoint {}: {e}",
            credentials.authorize_endpoint()
        ))
    })?;

    let state = params.state.unwrap_or_else(generate_state);
    let nonce = params.nonce.unwrap_or_else(generate_state);

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("client_id", credentials.client_id());
        query.append_pair("response_type", "code");
        if let Some(redirect_uri) = credentials.redirect_uri() {
            query.append_pair("redirect_uri", redirect_uri);
        }
        query.append_pair("scope", &params.scopes.to_string());
        if let Some(purpose) = &params.purpose {
            query.append_pair("purpose", purpose);
        }
        query.append_pair("state", &state);
        query.append_pair("nonce", &nonce);
        if let Some(login_hint) = &params.login_hint {
            query.append_pair("login_hint", login_hint);
        }
        query.append_pair("max_age", "0");
    }

    Ok(AuthorizationUrl {
        url: url.into(),
        state,
        nonce,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn query_of(url: &str) -> HashMap<String, String> {
        Url::parse(url).unwrap().query_pairs().into_owned().collect()
    }

    fn credentials() -> CredentialSet {
        CredentialSet::new("client-123", "secret")
            .with_redirect_uri("https://app.example.com/callback")
            .with_auth_base_url("https://oidc.example.test")
    }

    #[test]
    fn url_contains_required_params() {
        let auth = build_authorization_url(
            &credentials(),
            AuthorizationParams {
                scopes: ScopeSet::parse("openid"),
                purpose: Some("dpv:FraudPreventionAndDetection:number-verification".into()),
                state: Some("state-abc".into()),
                nonce: Some("nonce-xyz".into()),
                login_hint: None,
            },
        )
        .unwrap();

        assert!(auth.url.starts_with("https://oidc.example.test/oauth2/auth?"));
        let query = query_of(&auth.url);
        assert_eq!(query["client_id"], "client-123");
        assert_eq!(query["response_type"], "code");
        assert_eq!(query["redirect_uri"], "https://app.example.com/callback");
        assert_eq!(query["scope"], "openid");
        assert_eq!(
            query["purpose"],
            "dpv:FraudPreventionAndDetection:number-verification"
        );
        assert_eq!(query["state"], "state-abc");
        assert_eq!(query["nonce"], "nonce-xyz");
        assert_eq!(query["max_age"], "0");
        assert!(!query.contains_key("login_hint"));
    }

    #[test]
    fn state_and_nonce_default_to_random_tokens() {
        let a = build_authorization_url(&credentials(), AuthorizationParams::default()).unwrap();
        let b = build_authorization_url(&credentials(), AuthorizationParams::default()).unwrap();

        assert_ne!(a.state, b.state, "states must not collide");
        assert_ne!(a.state, a.nonce, "state and nonce are generated independently");
        let query = query_of(&a.url);
        assert_eq!(query["state"], a.state);
        assert_eq!(query["nonce"], a.nonce);
    }

    #[test]
    fn redirect_uri_omitted_when_unset() {
        let creds = CredentialSet::new("client-123", "secret");
        let auth = build_authorization_url(&creds, AuthorizationParams::default()).unwrap();
        assert!(!query_of(&auth.url).contains_key("redirect_uri"));
    }

    #[test]
    fn login_hint_is_included_when_set() {
        let auth = build_authorization_url(
            &credentials(),
            AuthorizationParams {
                login_hint: Some("tel:+555123456789".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(query_of(&auth.url)["login_hint"], "tel:+555123456789");
    }

    #[test]
    fn empty_client_id_is_rejected() {
        let creds = CredentialSet::new("", "secret");
        let err = build_authorization_url(&creds, AuthorizationParams::default()).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)), "got {err:?}");
    }

    #[test]
    fn generated_state_is_url_safe_base64() {
        let state = generate_state();
        // 32 bytes -> 43 base64url chars without padding
        assert_eq!(state.len(), 43);
        assert!(
            state
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "state must be URL-safe base64: {state}"
        );
    }
}
