//! Client identity and endpoint locations
//!
//! A `CredentialSet` is built once from validated settings and shared by
//! reference (`Arc<CredentialSet>`) with every session manager and the
//! request executor. It is never mutated after construction.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use common::Secret;

use crate::constants::{AUTHORIZE_PATH, DEFAULT_API_BASE_URL, DEFAULT_AUTH_BASE_URL, TOKEN_PATH};

#[derive(Debug, Clone)]
pub struct CredentialSet {
    client_id: String,
    client_secret: Secret<String>,
    redirect_uri: Option<String>,
    auth_base_url: String,
    api_base_url: String,
}

impl CredentialSet {
    /// Credentials against the production endpoints.
    ///
    /// No validation happens here: an empty id or secret surfaces as
    /// `MissingCredentials` when a client-credentials grant is attempted.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<Secret<String>>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: None,
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        let redirect_uri = redirect_uri.into();
        self.redirect_uri = (!redirect_uri.trim().is_empty()).then_some(redirect_uri);
        self
    }

    pub fn with_auth_base_url(mut self, url: impl Into<String>) -> Self {
        self.auth_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &Secret<String> {
        &self.client_secret
    }

    pub fn redirect_uri(&self) -> Option<&str> {
        self.redirect_uri.as_deref()
    }

    pub fn auth_base_url(&self) -> &str {
        &self.auth_base_url
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Both halves of the client-credentials pair are present.
    pub fn has_client_credentials(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.is_blank()
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}{TOKEN_PATH}", self.auth_base_url)
    }

    pub fn authorize_endpoint(&self) -> String {
        format!("{}{AUTHORIZE_PATH}", self.auth_base_url)
    }

    /// `Basic base64(client_id:client_secret)` for the token endpoint.
    pub(crate) fn basic_authorization(&self) -> String {
        let pair = format!("{}:{}", self.client_id, self.client_secret.expose());
        format!("Basic {}", STANDARD.encode(pair))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_production() {
        let creds = CredentialSet::new("id", "secret");
        assert_eq!(creds.token_endpoint(), "https://oidc.gateway-x.io/oauth2/token");
        assert_eq!(creds.authorize_endpoint(), "https://oidc.gateway-x.io/oauth2/auth");
        assert_eq!(creds.api_base_url(), "https://api.gateway-x.io");
        assert!(creds.redirect_uri().is_none());
    }

    #[test]
    fn base_urls_drop_trailing_slash() {
        let creds = CredentialSet::new("id", "secret")
            .with_auth_base_url("http://localhost:4000/")
            .with_api_base_url("http://localhost:5000//");
        assert_eq!(creds.token_endpoint(), "http://localhost:4000/oauth2/token");
        assert_eq!(creds.api_base_url(), "http://localhost:5000");
    }

    #[test]
    fn basic_authorization_encodes_id_and_secret() {
        let creds = CredentialSet::new("id", "secret");
        // base64("id:secret")
        assert_eq!(creds.basic_authorization(), "Basic aWQ6c2VjcmV0");
    }

    #[test]
    fn blank_redirect_uri_is_treated_as_absent() {
        let creds = CredentialSet::new("id", "secret").with_redirect_uri("  ");
        assert!(creds.redirect_uri().is_none());
    }

    #[test]
    fn client_credentials_presence() {
        assert!(CredentialSet::new("id", "secret").has_client_credentials());
        assert!(!CredentialSet::new("id", "").has_client_credentials());
        assert!(!CredentialSet::new("", "secret").has_client_credentials());
    }

    #[test]
    fn debug_redacts_secret() {
        let creds = CredentialSet::new("id", "super-secret-value");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("super-secret-value"), "got: {debug}");
        assert!(debug.contains("[REDACTED]"));
    }
}
