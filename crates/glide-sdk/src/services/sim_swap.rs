//! SIM-swap detection

use std::sync::Arc;

use glide_auth::{ScopeSet, Session, SessionManager};
use serde::{Deserialize, Serialize};

use super::ServiceContext;
use crate::error::{Error, Result};
use crate::executor::ApiCall;
use crate::identifier::UserIdentifier;
use crate::phone::normalize_phone_number;

const SERVICE: &str = "sim_swap";
const CHECK_PATH: &str = "/sim-swap/check";
const RETRIEVE_DATE_PATH: &str = "/sim-swap/retrieve-date";

#[derive(Debug, Clone, Default)]
pub struct SimSwapCheckParams {
    /// Defaults to the bound identifier's number
    pub phone_number: Option<String>,
    /// Look-back window in hours
    pub max_age: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct SimSwapRetrieveDateParams {
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimSwapCheckResponse {
    pub swapped: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimSwapRetrieveDateResponse {
    /// RFC 3339 timestamp of the last SIM change, absent if never changed
    #[serde(default)]
    pub latest_sim_change: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckRequest {
    phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_age: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveDateRequest {
    phone_number: String,
}

pub struct SimSwapClient {
    context: ServiceContext,
    sessions: Arc<SessionManager>,
    scopes: ScopeSet,
}

impl SimSwapClient {
    pub(crate) fn new(context: ServiceContext, scopes: ScopeSet) -> Self {
        let sessions = Arc::new(context.client_credentials_sessions());
        Self {
            context,
            sessions,
            scopes,
        }
    }

    /// A client bound to one user. All user clients share this client's session.
    pub fn for_identifier(&self, identifier: UserIdentifier) -> SimSwapUserClient {
        SimSwapUserClient {
            context: self.context.clone(),
            sessions: self.sessions.clone(),
            scopes: self.scopes.clone(),
            identifier,
        }
    }
}

pub struct SimSwapUserClient {
    context: ServiceContext,
    sessions: Arc<SessionManager>,
    scopes: ScopeSet,
    identifier: UserIdentifier,
}

impl SimSwapUserClient {
    pub fn identifier(&self) -> &UserIdentifier {
        &self.identifier
    }

    /// Whether the SIM was swapped, optionally within the last `max_age` hours.
    pub async fn check(&self, params: SimSwapCheckParams, pinned: Option<&Session>) -> Result<SimSwapCheckResponse> {
        let body = CheckRequest {
            phone_number: self.phone_number(params.phone_number.as_deref())?,
            max_age: params.max_age,
        };
        let call = ApiCall::post(SERVICE, CHECK_PATH, &self.scopes)
            .json(&body)?
            .pinned(pinned);
        self.context.executor.call(&self.sessions, call).await
    }

    pub async fn retrieve_date(
        &self,
        params: SimSwapRetrieveDateParams,
        pinned: Option<&Session>,
    ) -> Result<SimSwapRetrieveDateResponse> {
        let body = RetrieveDateRequest {
            phone_number: self.phone_number(params.phone_number.as_deref())?,
        };
        let call = ApiCall::post(SERVICE, RETRIEVE_DATE_PATH, &self.scopes)
            .json(&body)?
            .pinned(pinned);
        self.context.executor.call(&self.sessions, call).await
    }

    fn phone_number(&self, explicit: Option<&str>) -> Result<String> {
        match explicit.filter(|n| !n.trim().is_empty()) {
            Some(number) => Ok(normalize_phone_number(number)),
            None => self.identifier.phone_number().ok_or_else(|| {
                Error::InvalidRequest("SIM swap requires a phone number".into())
            }),
        }
    }
}
