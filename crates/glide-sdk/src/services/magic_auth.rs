//! Magic-link possession authentication
//!
//! `start_auth` asks the provider to begin a verification for a phone number
//! or email; depending on the carrier it answers with a link the user must
//! open on their device (`authUrl`) or with a one-time code flow. The token or
//! code the user ends up with is then checked with `verify_auth`.

use glide_auth::{ScopeSet, Session, SessionManager};
use serde::{Deserialize, Serialize};

use super::ServiceContext;
use crate::error::Result;
use crate::executor::ApiCall;
use crate::phone::normalize_phone_number;

const SERVICE: &str = "magic_auth";
const START_PATH: &str = "/magic-auth/verification/start";
const CHECK_PATH: &str = "/magic-auth/verification/check";

/// Who to verify. Serialized as `{"phoneNumber": ...}` or `{"email": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MagicAuthTarget {
    PhoneNumber(String),
    Email(String),
}

impl MagicAuthTarget {
    fn normalized(&self) -> Self {
        match self {
            MagicAuthTarget::PhoneNumber(number) => {
                MagicAuthTarget::PhoneNumber(normalize_phone_number(number))
            }
            MagicAuthTarget::Email(email) => MagicAuthTarget::Email(email.clone()),
        }
    }
}

/// What the user brought back: an SMS code or the token from the magic link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MagicAuthProof {
    Code(String),
    Token(String),
}

#[derive(Debug, Serialize)]
struct CheckRequest<'a> {
    #[serde(flatten)]
    target: &'a MagicAuthTarget,
    #[serde(flatten)]
    proof: &'a MagicAuthProof,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MagicAuthStartResponse {
    /// Verification flavour chosen by the provider, e.g. `MAGIC`
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "authUrl", default)]
    pub auth_url: Option<String>,
}

/// The check endpoint answers with a bare boolean or `{"verified": bool}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CheckResponse {
    Bare(bool),
    Wrapped { verified: bool },
}

impl CheckResponse {
    fn verified(self) -> bool {
        match self {
            CheckResponse::Bare(verified) | CheckResponse::Wrapped { verified } => verified,
        }
    }
}

pub struct MagicAuthClient {
    context: ServiceContext,
    sessions: SessionManager,
    scopes: ScopeSet,
}

impl MagicAuthClient {
    pub(crate) fn new(context: ServiceContext, scopes: ScopeSet) -> Self {
        let sessions = context.client_credentials_sessions();
        Self {
            context,
            sessions,
            scopes,
        }
    }

    pub async fn start_auth(
        &self,
        target: &MagicAuthTarget,
        pinned: Option<&Session>,
    ) -> Result<MagicAuthStartResponse> {
        let call = ApiCall::post(SERVICE, START_PATH, &self.scopes)
            .json(&target.normalized())?
            .pinned(pinned);
        self.context.executor.call(&self.sessions, call).await
    }

    /// True when the provider confirmed possession.
    pub async fn verify_auth(
        &self,
        target: &MagicAuthTarget,
        proof: &MagicAuthProof,
        pinned: Option<&Session>,
    ) -> Result<bool> {
        let target = target.normalized();
        let body = CheckRequest {
            target: &target,
            proof,
        };
        let call = ApiCall::post(SERVICE, CHECK_PATH, &self.scopes)
            .json(&body)?
            .pinned(pinned);
        let response: CheckResponse = self.context.executor.call(&self.sessions, call).await?;
        Ok(response.verified())
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }
}
