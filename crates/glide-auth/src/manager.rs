//! Session acquisition with a single cache slot and single-flight grants
//!
//! One `SessionManager` serves one logical actor. Its state is a single cache
//! slot plus at most one in-flight grant, both behind one async mutex:
//!
//! - a cached session valid for the required scopes is returned immediately
//! - a caller that finds a grant already running for a superset of its scopes
//!   waits on that grant instead of starting another
//! - otherwise the caller starts a grant; everyone waiting on it observes the
//!   same `Result`, success or failure
//!
//! Each grant runs on its own task. Callers only wait on its result, so a
//! caller that gives up never aborts the token endpoint call. The mutex is
//! never held across that call, and a failed grant leaves the cache slot
//! exactly as it was.

use std::sync::Arc;
use std::time::Duration;

use common::Secret;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};
use transport::{HttpOutcome, Transport};

use crate::constants::RENEWAL_MARGIN;
use crate::credentials::CredentialSet;
use crate::error::{Error, GrantFailure, Result};
use crate::grant::GrantRequest;
use crate::scope::ScopeSet;
use crate::session::Session;
use crate::token::TokenResponse;

/// Which grant a manager runs when its cache cannot satisfy a request.
#[derive(Debug, Clone)]
pub enum GrantStrategy {
    ClientCredentials,
    AuthorizationCode { code: Secret<String> },
}

impl GrantStrategy {
    /// Build the grant for one attempt, checking inputs before any network call.
    fn grant_request(&self, credentials: &CredentialSet, required: &ScopeSet) -> Result<GrantRequest> {
        match self {
            GrantStrategy::ClientCredentials => {
                if !credentials.has_client_credentials() {
                    return Err(Error::MissingCredentials);
                }
                Ok(GrantRequest::ClientCredentials {
                    scopes: required.clone(),
                })
            }
            GrantStrategy::AuthorizationCode { code } => {
                if code.is_blank() {
                    return Err(Error::MissingAuthCode);
                }
                if !credentials.has_client_credentials() {
                    return Err(Error::MissingCredentials);
                }
                let redirect_uri = credentials.redirect_uri().ok_or_else(|| {
                    Error::Configuration(
                        "redirect uri is required for the authorization-code grant".into(),
                    )
                })?;
                Ok(GrantRequest::AuthorizationCode {
                    code: code.clone(),
                    redirect_uri: redirect_uri.to_string(),
                })
            }
        }
    }
}

/// The single session slot of one manager.
///
/// Holds whatever was last installed. Validity is judged by the manager, not
/// here.
#[derive(Debug, Default)]
pub struct SessionCache {
    slot: Option<Session>,
}

impl SessionCache {
    pub fn get(&self) -> Option<&Session> {
        self.slot.as_ref()
    }

    /// Replace the slot contents.
    pub fn put(&mut self, session: Session) {
        self.slot = Some(session);
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}

/// Result of one grant, `None` until its task finishes.
type GrantWatch = watch::Receiver<Option<Result<Session>>>;

struct InFlight {
    scopes: ScopeSet,
    done: GrantWatch,
}

#[derive(Default)]
struct State {
    cache: SessionCache,
    in_flight: Option<InFlight>,
}

impl State {
    /// Retire `grant` if it is still the tracked one, caching a successful
    /// result. A superseded grant reaches its own waiters only.
    fn finish(&mut self, grant: &GrantWatch, result: &Result<Session>) {
        let retired = self.in_flight.take_if(|f| f.done.same_channel(grant));
        if let (Some(_), Ok(session)) = (retired, result) {
            self.cache.put(session.clone());
        }
    }
}

/// What a grant task needs from its manager, owned so the task can outlive
/// every caller.
#[derive(Clone)]
struct TokenEndpoint {
    credentials: Arc<CredentialSet>,
    transport: Arc<dyn Transport>,
    renewal_margin: Duration,
}

impl TokenEndpoint {
    async fn exchange(&self, grant: GrantRequest) -> Result<Session> {
        let grant_type = grant.grant_type();
        info!(grant_type, "requesting session from token endpoint");

        let result = self.run_exchange(&grant).await;
        let outcome = if result.is_ok() { "success" } else { "failure" };
        metrics::counter!("glide_token_grants_total", "grant_type" => grant_type, "outcome" => outcome)
            .increment(1);

        match &result {
            Ok(session) => info!(
                grant_type,
                scopes = %session.scopes(),
                expires_in_secs = session.expires_in().as_secs(),
                "session acquired"
            ),
            Err(e) => warn!(grant_type, error = %e, "session acquisition failed"),
        }
        result
    }

    async fn run_exchange(&self, grant: &GrantRequest) -> Result<Session> {
        let request = grant.to_http_request(&self.credentials)?;
        match self.transport.execute(request).await {
            HttpOutcome::Success { body, .. } => {
                TokenResponse::decode(&body)?.into_session(self.renewal_margin)
            }
            HttpOutcome::ClientOrServerError { status, body, .. } => Err(GrantFailure::Rejected {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            }
            .into()),
            HttpOutcome::TransportFailure(e) => Err(GrantFailure::Transport(e).into()),
        }
    }
}

pub struct SessionManager {
    endpoint: TokenEndpoint,
    strategy: GrantStrategy,
    state: Arc<Mutex<State>>,
}

impl SessionManager {
    pub fn new(
        credentials: Arc<CredentialSet>,
        transport: Arc<dyn Transport>,
        strategy: GrantStrategy,
    ) -> Self {
        Self {
            endpoint: TokenEndpoint {
                credentials,
                transport,
                renewal_margin: RENEWAL_MARGIN,
            },
            strategy,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Manager for an application identity.
    pub fn client_credentials(credentials: Arc<CredentialSet>, transport: Arc<dyn Transport>) -> Self {
        Self::new(credentials, transport, GrantStrategy::ClientCredentials)
    }

    /// Manager for one end user, exchanging the code from their redirect.
    pub fn authorization_code(
        credentials: Arc<CredentialSet>,
        transport: Arc<dyn Transport>,
        code: impl Into<Secret<String>>,
    ) -> Self {
        Self::new(
            credentials,
            transport,
            GrantStrategy::AuthorizationCode { code: code.into() },
        )
    }

    pub fn with_renewal_margin(mut self, margin: Duration) -> Self {
        self.endpoint.renewal_margin = margin;
        self
    }

    pub fn strategy(&self) -> &GrantStrategy {
        &self.strategy
    }

    pub fn credentials(&self) -> &Arc<CredentialSet> {
        &self.endpoint.credentials
    }

    /// Return a session granting every scope in `required`.
    ///
    /// A `pinned` session is returned unchanged without any validity check.
    /// Otherwise the cached session is reused while it is fresh beyond the
    /// renewal margin and covers `required`; failing that, one grant runs
    /// and its session replaces the cache.
    ///
    /// Must be called within a Tokio runtime: grants run on spawned tasks.
    pub async fn acquire(&self, required: &ScopeSet, pinned: Option<&Session>) -> Result<Session> {
        if let Some(session) = pinned {
            return Ok(session.clone());
        }

        let mut done = {
            let mut state = self.state.lock().await;

            let valid = state
                .cache
                .get()
                .filter(|s| s.is_valid_for(required, self.endpoint.renewal_margin));
            if let Some(session) = valid {
                debug!(scopes = %required, "session cache hit");
                metrics::counter!("glide_session_cache_hits_total").increment(1);
                return Ok(session.clone());
            }

            let joinable = state
                .in_flight
                .as_ref()
                .filter(|flight| flight.scopes.covers(required))
                .map(|flight| flight.done.clone());
            match joinable {
                Some(done) => {
                    debug!(scopes = %required, "joining in-flight grant");
                    done
                }
                None => {
                    let grant = self.strategy.grant_request(&self.endpoint.credentials, required)?;
                    let done = self.start_grant(grant);
                    state.in_flight = Some(InFlight {
                        scopes: required.clone(),
                        done: done.clone(),
                    });
                    done
                }
            }
        };

        let finished = done
            .wait_for(Option::is_some)
            .await
            .map(|result| (*result).clone());
        match finished {
            Ok(Some(result)) => result,
            // the grant task died without publishing
            _ => Err(GrantFailure::Interrupted.into()),
        }
    }

    /// The cached session, valid or not.
    pub async fn cached(&self) -> Option<Session> {
        self.state.lock().await.cache.get().cloned()
    }

    /// Drop the cached session so the next `acquire` runs a grant.
    pub async fn invalidate(&self) {
        self.state.lock().await.cache.clear();
    }

    /// Spawn the exchange for `grant`. The task installs a successful session
    /// before publishing, so a caller woken by the result finds it cached.
    fn start_grant(&self, grant: GrantRequest) -> GrantWatch {
        let (publish, done) = watch::channel(None);
        let endpoint = self.endpoint.clone();
        let state = self.state.clone();
        let tracked = done.clone();

        tokio::spawn(async move {
            let result = endpoint.exchange(grant).await;
            state.lock().await.finish(&tracked, &result);
            publish.send_replace(Some(result));
        });
        done
    }
}
