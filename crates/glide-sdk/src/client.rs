//! Top-level client

use std::sync::Arc;

use glide_auth::CredentialSet;
use tracing::info;
use transport::{ReqwestTransport, Transport};

use crate::config::Settings;
use crate::error::Result;
use crate::executor::Executor;
use crate::services::ServiceContext;
use crate::services::magic_auth::MagicAuthClient;
use crate::services::number_verify::NumberVerifyClient;
use crate::services::sim_swap::SimSwapClient;
use crate::services::telco_finder::TelcoFinderClient;

/// Entry point to the Glide verification APIs.
///
/// Owns one credential set, one transport and one executor, shared by the
/// four service clients. Each client-credentials service keeps its own
/// session cache.
pub struct GlideClient {
    credentials: Arc<CredentialSet>,
    magic_auth: MagicAuthClient,
    number_verify: NumberVerifyClient,
    sim_swap: SimSwapClient,
    telco_finder: TelcoFinderClient,
}

impl GlideClient {
    /// Validate `settings` and build a client over HTTPS.
    pub fn new(settings: Settings) -> Result<Self> {
        // validate before building the HTTP stack
        settings.credentials()?;
        let transport = ReqwestTransport::with_timeout(settings.timeout())?;
        Self::with_transport(settings, Arc::new(transport))
    }

    /// Build a client over a caller-supplied transport.
    pub fn with_transport(settings: Settings, transport: Arc<dyn Transport>) -> Result<Self> {
        let credentials = Arc::new(settings.credentials()?);
        let executor = Arc::new(Executor::new(transport, credentials.api_base_url()));
        let context = ServiceContext::new(credentials.clone(), executor);
        let scopes = &settings.scopes;

        info!(
            client_id = credentials.client_id(),
            auth_base_url = credentials.auth_base_url(),
            api_base_url = credentials.api_base_url(),
            "glide client initialized"
        );

        Ok(Self {
            magic_auth: MagicAuthClient::new(context.clone(), scopes.magic_auth()),
            number_verify: NumberVerifyClient::new(context.clone(), scopes.number_verify()),
            sim_swap: SimSwapClient::new(context.clone(), scopes.sim_swap()),
            telco_finder: TelcoFinderClient::new(context, scopes.telco_finder()),
            credentials,
        })
    }

    pub fn credentials(&self) -> &CredentialSet {
        &self.credentials
    }

    pub fn magic_auth(&self) -> &MagicAuthClient {
        &self.magic_auth
    }

    pub fn number_verify(&self) -> &NumberVerifyClient {
        &self.number_verify
    }

    pub fn sim_swap(&self) -> &SimSwapClient {
        &self.sim_swap
    }

    pub fn telco_finder(&self) -> &TelcoFinderClient {
        &self.telco_finder
    }
}
