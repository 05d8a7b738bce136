//! Token endpoint response decoding
//!
//! `expires_in` is a delta in seconds from the response time; it is turned
//! into an absolute expiry instant when the session is built. `scope` is the
//! space-delimited list of scopes actually granted, which may differ from the
//! scopes requested.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::error::{GrantFailure, Result};
use crate::scope::ScopeSet;
use crate::session::Session;

#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Seconds until the access token expires (delta, not absolute)
    pub expires_in: u64,
    #[serde(default)]
    pub scope: String,
}

impl TokenResponse {
    pub fn decode(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| GrantFailure::InvalidResponse(Arc::new(e)).into())
    }

    /// Build a session expiring `expires_in` seconds from now.
    ///
    /// A token that would already sit inside the renewal margin is refused:
    /// handing it out would let it expire mid-request. So is a lifetime the
    /// clock cannot represent.
    pub fn into_session(self, renewal_margin: Duration) -> Result<Session> {
        if self.expires_in <= renewal_margin.as_secs() {
            return Err(GrantFailure::ShortLived {
                expires_in: self.expires_in,
                margin_secs: renewal_margin.as_secs(),
            }
            .into());
        }
        let expires_at = Instant::now()
            .checked_add(Duration::from_secs(self.expires_in))
            .ok_or(GrantFailure::LifetimeOutOfRange {
                expires_in: self.expires_in,
            })?;
        Ok(Session::new(
            self.access_token,
            expires_at,
            ScopeSet::parse(&self.scope),
        ))
    }
}
