//! Authenticated request executor
//!
//! Resolves a session through the caller's `SessionManager`, attaches it as a
//! bearer token, performs one exchange and decodes the JSON response. Every
//! failure is surfaced as a distinct `Error` variant:
//!
//! - no session: `Error::Auth`
//! - status >= 400: `Error::Api` with status, raw body and headers
//! - network failure: `Error::Transport`
//! - 2xx with an unexpected body: `Error::ResponseDecode`

use std::sync::Arc;

use glide_auth::{ScopeSet, Session, SessionManager};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use transport::header::{AUTHORIZATION, CONTENT_TYPE, HeaderName, HeaderValue};
use transport::{Bytes, HeaderMap, HttpOutcome, HttpRequest, Method, Transport};

use crate::error::{Error, Result};

/// One resource-endpoint call.
#[derive(Debug)]
pub struct ApiCall<'a> {
    service: &'static str,
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
    scopes: &'a ScopeSet,
    pinned: Option<&'a Session>,
}

impl<'a> ApiCall<'a> {
    /// `service` labels logs and metrics; `scopes` is what the session must grant.
    pub fn new(service: &'static str, method: Method, path: impl Into<String>, scopes: &'a ScopeSet) -> Self {
        Self {
            service,
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            scopes,
            pinned: None,
        }
    }

    pub fn post(service: &'static str, path: impl Into<String>, scopes: &'a ScopeSet) -> Self {
        Self::new(service, Method::POST, path, scopes)
    }

    /// Serialize `body` as the JSON request body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| Error::InvalidRequest(format!("request body is not serializable: {e}")))?;
        self.body = Bytes::from(bytes);
        Ok(self)
    }

    /// Add a caller header. `Authorization` and `Content-Type` are always
    /// replaced by the executor.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Use this session as-is instead of the manager's.
    pub fn pinned(mut self, session: Option<&'a Session>) -> Self {
        self.pinned = session;
        self
    }
}

/// Sends authenticated calls to the resource server.
pub struct Executor {
    transport: Arc<dyn Transport>,
    api_base_url: String,
}

impl Executor {
    pub fn new(transport: Arc<dyn Transport>, api_base_url: impl Into<String>) -> Self {
        Self {
            transport,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Acquire a session, send the call and decode the response as `T`.
    pub async fn call<T: DeserializeOwned>(&self, sessions: &SessionManager, call: ApiCall<'_>) -> Result<T> {
        let body = self.send(sessions, call).await?;
        serde_json::from_slice(&body).map_err(|source| Error::ResponseDecode {
            source,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }

    /// Acquire a session and send the call, returning the raw success body.
    pub async fn send(&self, sessions: &SessionManager, call: ApiCall<'_>) -> Result<Bytes> {
        let session = sessions.acquire(call.scopes, call.pinned).await?;

        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", session.access_token()))
            .map_err(|_| Error::InvalidRequest("access token is not a valid header value".into()))?;
        authorization.set_sensitive(true);

        let mut headers = call.headers;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, authorization);

        let url = format!("{}{}", self.api_base_url, call.path);
        let request = HttpRequest::new(call.method, url).headers(headers).body(call.body);

        let outcome = self.transport.execute(request).await;
        crate::metrics::record_api_request(call.service, outcome.label());

        match outcome {
            HttpOutcome::Success { status, body } => {
                debug!(service = call.service, path = %call.path, status = status.as_u16(), "API call succeeded");
                Ok(body)
            }
            HttpOutcome::ClientOrServerError {
                status,
                body,
                headers,
            } => {
                warn!(service = call.service, path = %call.path, status = status.as_u16(), "API call rejected");
                Err(Error::Api {
                    status,
                    body: String::from_utf8_lossy(&body).into_owned(),
                    headers,
                })
            }
            HttpOutcome::TransportFailure(e) => {
                warn!(service = call.service, path = %call.path, error = %e, "API call failed");
                Err(Error::Transport(e))
            }
        }
    }
}
