//! Per-product clients
//!
//! Each client maps its operations onto `Executor` calls and owns the
//! session manager for its logical actor: the application identity for the
//! client-credentials services, one end user for number verification.

pub mod magic_auth;
pub mod number_verify;
pub mod sim_swap;
pub mod telco_finder;

use std::sync::Arc;

use glide_auth::{CredentialSet, SessionManager};

use crate::executor::Executor;

/// State shared by every service client of one `GlideClient`.
#[derive(Clone)]
pub(crate) struct ServiceContext {
    pub(crate) credentials: Arc<CredentialSet>,
    pub(crate) executor: Arc<Executor>,
}

impl ServiceContext {
    pub(crate) fn new(credentials: Arc<CredentialSet>, executor: Arc<Executor>) -> Self {
        Self {
            credentials,
            executor,
        }
    }

    pub(crate) fn client_credentials_sessions(&self) -> SessionManager {
        SessionManager::client_credentials(self.credentials.clone(), self.executor.transport().clone())
    }

    pub(crate) fn authorization_code_sessions(&self, code: String) -> SessionManager {
        SessionManager::authorization_code(
            self.credentials.clone(),
            self.executor.transport().clone(),
            code,
        )
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use transport::testing::ScriptedTransport;

    pub(crate) const TOKEN: &str = "/oauth2/token";

    pub(crate) fn token_body(token: &str, scope: &str) -> String {
        format!(r#"{{"access_token":"{token}","expires_in":3600,"scope":"{scope}"}}"#)
    }

    /// A context over a scripted transport with test endpoints.
    pub(crate) fn context(transport: &Arc<ScriptedTransport>) -> ServiceContext {
        let credentials = Arc::new(
            CredentialSet::new("client-id", "client-secret")
                .with_redirect_uri("https://app.example.com/callback")
                .with_auth_base_url("https://oidc.example.test")
                .with_api_base_url("https://api.example.test"),
        );
        let executor = Arc::new(Executor::new(transport.clone(), credentials.api_base_url()));
        ServiceContext::new(credentials, executor)
    }

    /// JSON body of the last request sent to `path`.
    pub(crate) fn last_body(transport: &ScriptedTransport, path: &str) -> serde_json::Value {
        let request = transport
            .requests()
            .into_iter()
            .rev()
            .find(|r| r.url.ends_with(path))
            .expect("no request sent to path");
        serde_json::from_slice(&request.body).expect("request body is not JSON")
    }
}
