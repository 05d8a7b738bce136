//! Glide OAuth endpoints and session timing
//!
//! The base URLs are production defaults; deployments override them through
//! `CredentialSet`. Paths are appended to the authorization-server base.

use std::time::Duration;

/// Production authorization server (token + authorize endpoints)
pub const DEFAULT_AUTH_BASE_URL: &str = "https://oidc.gateway-x.io";

/// Production resource server (verification APIs)
pub const DEFAULT_API_BASE_URL: &str = "https://api.gateway-x.io";

/// Token endpoint path for both grant types
pub const TOKEN_PATH: &str = "/oauth2/token";

/// Browser authorization endpoint path
pub const AUTHORIZE_PATH: &str = "/oauth2/auth";

/// A session is renewed once it is this close to expiry, so a token never
/// expires between the validity check and its use on the wire.
pub const RENEWAL_MARGIN: Duration = Duration::from_secs(60);
