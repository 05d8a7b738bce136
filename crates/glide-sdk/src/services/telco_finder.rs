//! Carrier and network lookup

use glide_auth::{ScopeSet, Session, SessionManager};
use serde::{Deserialize, Serialize};

use super::ServiceContext;
use crate::error::Result;
use crate::executor::ApiCall;
use crate::identifier::UserIdentifier;
use crate::phone::normalize_phone_number;

const SERVICE: &str = "telco_finder";
const NETWORK_ID_PATH: &str = "/telco-finder/v1/resolve-network-id";
const SEARCH_PATH: &str = "/telco-finder/v1/search";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelcoFinderNetworkIdResponse {
    pub network_id: String,
}

/// WebFinger-style lookup result.
#[derive(Debug, Clone, Deserialize)]
pub struct TelcoFinderSearchResponse {
    pub subject: String,
    #[serde(default)]
    pub properties: TelcoFinderProperties,
    #[serde(default)]
    pub links: Vec<TelcoFinderLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelcoFinderProperties {
    #[serde(rename = "operator_Id", default)]
    pub operator_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelcoFinderLink {
    pub rel: String,
    pub href: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NetworkIdRequest {
    phone_number: String,
}

#[derive(Serialize)]
struct SearchRequest {
    resource: String,
}

pub struct TelcoFinderClient {
    context: ServiceContext,
    sessions: SessionManager,
    scopes: ScopeSet,
}

impl TelcoFinderClient {
    pub(crate) fn new(context: ServiceContext, scopes: ScopeSet) -> Self {
        let sessions = context.client_credentials_sessions();
        Self {
            context,
            sessions,
            scopes,
        }
    }

    /// Network id of the carrier currently serving `phone_number`.
    pub async fn network_id_for_number(
        &self,
        phone_number: &str,
        pinned: Option<&Session>,
    ) -> Result<TelcoFinderNetworkIdResponse> {
        let body = NetworkIdRequest {
            phone_number: normalize_phone_number(phone_number),
        };
        let call = ApiCall::post(SERVICE, NETWORK_ID_PATH, &self.scopes)
            .json(&body)?
            .pinned(pinned);
        self.context.executor.call(&self.sessions, call).await
    }

    /// Find the operator behind any identifier.
    pub async fn lookup(
        &self,
        identifier: &UserIdentifier,
        pinned: Option<&Session>,
    ) -> Result<TelcoFinderSearchResponse> {
        let body = SearchRequest {
            resource: identifier.telco_subject(),
        };
        let call = ApiCall::post(SERVICE, SEARCH_PATH, &self.scopes)
            .json(&body)?
            .pinned(pinned);
        self.context.executor.call(&self.sessions, call).await
    }

    pub async fn lookup_number(
        &self,
        phone_number: &str,
        pinned: Option<&Session>,
    ) -> Result<TelcoFinderSearchResponse> {
        self.lookup(&UserIdentifier::phone(phone_number), pinned).await
    }

    pub async fn lookup_ip(&self, address: &str, pinned: Option<&Session>) -> Result<TelcoFinderSearchResponse> {
        self.lookup(&UserIdentifier::ip(address), pinned).await
    }
}
