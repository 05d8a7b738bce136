//! Glide OAuth session layer
//!
//! Acquires, caches, validates and renews bearer sessions for the Glide
//! verification APIs. Each `SessionManager` owns one cache slot for one
//! logical actor (an application identity under client-credentials, or one
//! end user under authorization-code) and collapses concurrent acquisitions
//! into a single in-flight grant.
//!
//! Session flow:
//! 1. Caller asks `SessionManager::acquire()` for a scope set
//! 2. A cached session that is fresh and covers the scopes is returned as-is
//! 3. Otherwise a `GrantRequest` is built from the manager's `GrantStrategy`
//!    and POSTed to the token endpoint with HTTP Basic client authentication
//! 4. The decoded `TokenResponse` becomes a `Session` that replaces the cache
//!
//! `authorize::build_authorization_url()` produces the browser URL that
//! starts an authorization-code flow.

pub mod authorize;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod grant;
pub mod manager;
pub mod scope;
pub mod session;
pub mod token;

pub use authorize::{AuthorizationParams, AuthorizationUrl, build_authorization_url, generate_state};
pub use constants::*;
pub use credentials::CredentialSet;
pub use error::{Error, GrantFailure, Result};
pub use grant::GrantRequest;
pub use manager::{GrantStrategy, SessionCache, SessionManager};
pub use scope::ScopeSet;
pub use session::Session;
pub use token::TokenResponse;
