//! Token endpoint grant requests
//!
//! Both grant types POST a form-urlencoded body to the token endpoint and
//! authenticate the client with HTTP Basic (`base64(client_id:client_secret)`).
//! Only the body differs:
//!
//! - client-credentials: `grant_type=client_credentials&scope=<scopes>`
//! - authorization-code: `grant_type=authorization_code&code=<code>&redirect_uri=<uri>`

use common::Secret;
use transport::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use transport::{HeaderMap, HttpRequest, Method};
use url::form_urlencoded;

use crate::credentials::CredentialSet;
use crate::error::{Error, Result};
use crate::scope::ScopeSet;

/// One acquisition attempt's grant. Built per attempt, never stored.
#[derive(Debug, Clone)]
pub enum GrantRequest {
    ClientCredentials {
        scopes: ScopeSet,
    },
    AuthorizationCode {
        code: Secret<String>,
        redirect_uri: String,
    },
}

impl GrantRequest {
    /// The OAuth `grant_type` value.
    pub fn grant_type(&self) -> &'static str {
        match self {
            GrantRequest::ClientCredentials { .. } => "client_credentials",
            GrantRequest::AuthorizationCode { .. } => "authorization_code",
        }
    }

    /// Form-urlencoded request body.
    pub fn form_body(&self) -> String {
        let mut form = form_urlencoded::Serializer::new(String::new());
        form.append_pair("grant_type", self.grant_type());
        match self {
            GrantRequest::ClientCredentials { scopes } => {
                form.append_pair("scope", &scopes.to_string());
            }
            GrantRequest::AuthorizationCode { code, redirect_uri } => {
                form.append_pair("code", code.expose());
                form.append_pair("redirect_uri", redirect_uri);
            }
        }
        form.finish()
    }

    /// The complete token endpoint request for this grant.
    pub fn to_http_request(&self, credentials: &CredentialSet) -> Result<HttpRequest> {
        let mut authorization = HeaderValue::from_str(&credentials.basic_authorization())
            .map_err(|e| Error::Configuration(format!("client credentials are not header-safe: {e}")))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        Ok(HttpRequest::new(Method::POST, credentials.token_endpoint())
            .headers(headers)
            .body(self.form_body()))
    }
}
