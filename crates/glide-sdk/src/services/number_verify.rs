//! Number verification (authorization-code flow)
//!
//! 1. `get_auth_url` builds the URL the user opens on their mobile device
//! 2. the carrier redirects back to `redirect_uri` with a `code`
//! 3. `for_user(code)` exchanges the code for a per-user session
//! 4. `verify_number` asks whether the device's number matches
//!
//! Each user client owns its own `SessionManager`. An authorization code is
//! single-use, so once that user's session expires a new code is needed.

use glide_auth::{
    AuthorizationParams, AuthorizationUrl, ScopeSet, Session, SessionManager,
    build_authorization_url,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ServiceContext;
use crate::error::{Error, Result};
use crate::executor::ApiCall;
use crate::phone::normalize_phone_number;

const SERVICE: &str = "number_verify";
const VERIFY_PATH: &str = "/number-verification/verify";
const AUTH_SCOPE: &str = "openid";
const AUTH_PURPOSE: &str = "dpv:FraudPreventionAndDetection:number-verification";

#[derive(Debug, Clone, Default)]
pub struct NumberVerifyAuthUrlInput {
    /// Caller-chosen `state`; a random one is generated otherwise
    pub state: Option<String>,
    /// Sandbox number to pre-select via `login_hint`
    pub use_dev_number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NumberVerifyClientForParams {
    pub code: String,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberVerifyResponse {
    pub device_phone_number_verified: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest {
    phone_number: String,
}

pub struct NumberVerifyClient {
    context: ServiceContext,
    scopes: ScopeSet,
}

impl NumberVerifyClient {
    pub(crate) fn new(context: ServiceContext, scopes: ScopeSet) -> Self {
        Self { context, scopes }
    }

    /// Authorization URL for the user's device, with the state and nonce used.
    pub fn get_auth_url(&self, input: NumberVerifyAuthUrlInput) -> Result<AuthorizationUrl> {
        let params = AuthorizationParams {
            scopes: ScopeSet::parse(AUTH_SCOPE),
            purpose: Some(AUTH_PURPOSE.to_string()),
            state: input.state,
            nonce: None,
            login_hint: input
                .use_dev_number
                .map(|number| format!("tel:{}", normalize_phone_number(&number))),
        };
        Ok(build_authorization_url(&self.context.credentials, params)?)
    }

    /// Exchange the user's authorization code for a session.
    ///
    /// The session is acquired here so a bad or reused code fails now rather
    /// than on the first verification.
    pub async fn for_user(&self, params: NumberVerifyClientForParams) -> Result<NumberVerifyUserClient> {
        let sessions = self.context.authorization_code_sessions(params.code);
        sessions.acquire(&self.scopes, None).await?;
        debug!("number verification session started");
        Ok(NumberVerifyUserClient {
            context: self.context.clone(),
            sessions,
            scopes: self.scopes.clone(),
            phone_number: params.phone_number,
        })
    }
}

/// Number verification bound to one user's session.
pub struct NumberVerifyUserClient {
    context: ServiceContext,
    sessions: SessionManager,
    scopes: ScopeSet,
    phone_number: Option<String>,
}

impl NumberVerifyUserClient {
    /// Verify `phone_number`, or the number given to `for_user` when `None`.
    pub async fn verify_number(
        &self,
        phone_number: Option<&str>,
        pinned: Option<&Session>,
    ) -> Result<NumberVerifyResponse> {
        let number = phone_number
            .filter(|n| !n.trim().is_empty())
            .or(self.phone_number.as_deref().filter(|n| !n.trim().is_empty()))
            .ok_or_else(|| Error::InvalidRequest("a phone number is required to verify a number".into()))?;

        let body = VerifyRequest {
            phone_number: normalize_phone_number(number),
        };
        let call = ApiCall::post(SERVICE, VERIFY_PATH, &self.scopes)
            .json(&body)?
            .pinned(pinned);
        self.context.executor.call(&self.sessions, call).await
    }

    /// The user's current session, e.g. to pin it on a later call.
    pub async fn session(&self) -> Option<Session> {
        self.sessions.cached().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::services::test_support::{TOKEN, context, last_body, token_body};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use transport::testing::{ScriptedTransport, ok, status};

    fn client(transport: ScriptedTransport) -> (Arc<ScriptedTransport>, NumberVerifyClient) {
        let transport = Arc::new(transport);
        let client = NumberVerifyClient::new(context(&transport), ScopeSet::new());
        (transport, client)
    }

    fn query_of(url: &str) -> HashMap<String, String> {
        url::Url::parse(url).unwrap().query_pairs().into_owned().collect()
    }

    #[test]
    fn auth_url_requests_number_verification() {
        let (_, client) = client(ScriptedTransport::new());

        let auth = client
            .get_auth_url(NumberVerifyAuthUrlInput {
                state: Some("state-1".into()),
                use_dev_number: Some("+555 123 456 789".into()),
            })
            .unwrap();

        assert!(auth.url.starts_with("https://oidc.example.test/oauth2/auth?"));
        let query = query_of(&auth.url);
        assert_eq!(query["scope"], "openid");
        assert_eq!(query["purpose"], AUTH_PURPOSE);
        assert_eq!(query["state"], "state-1");
        assert_eq!(query["nonce"], auth.nonce);
        assert_eq!(query["login_hint"], "tel:+555123456789");
        assert_eq!(query["redirect_uri"], "https://app.example.com/callback");
        assert_eq!(query["max_age"], "0");
    }

    #[tokio::test]
    async fn for_user_exchanges_code_eagerly() {
        let (transport, client) =
            client(ScriptedTransport::new().on(TOKEN, ok(token_body("at_user", "openid"))));

        let user = client
            .for_user(NumberVerifyClientForParams {
                code: "code-abc".into(),
                phone_number: None,
            })
            .await
            .unwrap();

        assert_eq!(transport.calls_to(TOKEN), 1);
        assert_eq!(
            &transport.requests()[0].body[..],
            b"grant_type=authorization_code&code=code-abc&redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback"
        );
        assert_eq!(user.session().await.unwrap().access_token(), "at_user");
    }

    #[tokio::test]
    async fn for_user_with_rejected_code_fails() {
        let (_, client) = client(ScriptedTransport::new().on(TOKEN, status(400, r#"{"error":"invalid_grant"}"#)));

        let err = client
            .for_user(NumberVerifyClientForParams {
                code: "used-code".into(),
                phone_number: None,
            })
            .await
            .err()
            .unwrap();

        assert_eq!(err.kind(), ErrorKind::SessionAcquisitionFailed);
    }

    #[tokio::test]
    async fn for_user_without_code_is_missing_auth_code() {
        let (transport, client) = client(ScriptedTransport::new());

        let err = client
            .for_user(NumberVerifyClientForParams {
                code: String::new(),
                phone_number: None,
            })
            .await
            .err()
            .unwrap();

        assert_eq!(err.kind(), ErrorKind::MissingAuthCode);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn verify_number_uses_stored_number_and_user_session() {
        let (transport, client) = client(
            ScriptedTransport::new()
                .on(TOKEN, ok(token_body("at_user", "openid")))
                .on(VERIFY_PATH, ok(r#"{"devicePhoneNumberVerified":true}"#)),
        );
        let user = client
            .for_user(NumberVerifyClientForParams {
                code: "code-abc".into(),
                phone_number: Some("+555 123 456 789".into()),
            })
            .await
            .unwrap();

        let response = user.verify_number(None, None).await.unwrap();

        assert!(response.device_phone_number_verified);
        assert_eq!(last_body(&transport, VERIFY_PATH), json!({"phoneNumber": "+555123456789"}));
        // the code is exchanged once; verification reuses the cached session
        assert_eq!(transport.calls_to(TOKEN), 1);
    }

    #[tokio::test]
    async fn explicit_number_overrides_stored_one() {
        let (transport, client) = client(
            ScriptedTransport::new()
                .on(TOKEN, ok(token_body("at_user", "openid")))
                .on(VERIFY_PATH, ok(r#"{"devicePhoneNumberVerified":false}"#)),
        );
        let user = client
            .for_user(NumberVerifyClientForParams {
                code: "code-abc".into(),
                phone_number: Some("+1111".into()),
            })
            .await
            .unwrap();

        let response = user.verify_number(Some("+2222"), None).await.unwrap();

        assert!(!response.device_phone_number_verified);
        assert_eq!(last_body(&transport, VERIFY_PATH), json!({"phoneNumber": "+2222"}));
    }

    #[tokio::test]
    async fn verify_without_any_number_is_invalid_request() {
        let (transport, client) =
            client(ScriptedTransport::new().on(TOKEN, ok(token_body("at_user", "openid"))));
        let user = client
            .for_user(NumberVerifyClientForParams {
                code: "code-abc".into(),
                phone_number: None,
            })
            .await
            .unwrap();

        let err = user.verify_number(Some(""), None).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert_eq!(transport.calls_to(VERIFY_PATH), 0);
    }
}
