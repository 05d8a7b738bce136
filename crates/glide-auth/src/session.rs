//! Bearer sessions

use std::time::Duration;

use common::Secret;
use tokio::time::Instant;

use crate::scope::ScopeSet;

/// A bearer access token with its absolute expiry and granted scopes.
///
/// Sessions are replaced wholesale on renewal, never patched field by field.
/// Callers running multi-step user flows may keep a `Session` and pin it on
/// later calls.
#[derive(Debug, Clone)]
pub struct Session {
    access_token: Secret<String>,
    expires_at: Instant,
    scopes: ScopeSet,
}

impl Session {
    pub fn new(access_token: impl Into<String>, expires_at: Instant, scopes: ScopeSet) -> Self {
        Self {
            access_token: Secret::new(access_token.into()),
            expires_at,
            scopes,
        }
    }

    pub fn access_token(&self) -> &str {
        self.access_token.expose()
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn scopes(&self) -> &ScopeSet {
        &self.scopes
    }

    /// Time left before expiry, zero once expired.
    pub fn expires_in(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Still usable after `margin` has elapsed.
    pub fn is_fresh(&self, margin: Duration) -> bool {
        Instant::now()
            .checked_add(margin)
            .is_some_and(|deadline| deadline < self.expires_at)
    }

    /// Fresh beyond `margin` and granting every scope in `required`.
    pub fn is_valid_for(&self, required: &ScopeSet, margin: Duration) -> bool {
        self.is_fresh(margin) && self.scopes.covers(required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::RENEWAL_MARGIN;

    fn session_expiring_in(secs: u64, scopes: &str) -> Session {
        Session::new(
            "at_test",
            Instant::now() + Duration::from_secs(secs),
            ScopeSet::parse(scopes),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn valid_when_fresh_and_scopes_covered() {
        let session = session_expiring_in(3600, "magic-auth");
        assert!(session.is_valid_for(&ScopeSet::parse("magic-auth"), RENEWAL_MARGIN));
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_inside_renewal_margin() {
        let session = session_expiring_in(3600, "magic-auth");
        tokio::time::advance(Duration::from_secs(3540)).await;
        // exactly 60s left: not strictly beyond the margin
        assert!(!session.is_fresh(RENEWAL_MARGIN));
        assert!(session.is_fresh(Duration::from_secs(59)));
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_when_scope_missing() {
        let session = session_expiring_in(3600, "a");
        assert!(!session.is_valid_for(&ScopeSet::parse("b"), RENEWAL_MARGIN));
    }

    #[tokio::test(start_paused = true)]
    async fn expires_in_saturates_at_zero() {
        let session = session_expiring_in(10, "");
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(session.expires_in(), Duration::ZERO);
    }

    #[test]
    fn debug_redacts_token() {
        let session = Session::new("at_secret_token", Instant::now(), ScopeSet::new());
        let debug = format!("{session:?}");
        assert!(!debug.contains("at_secret_token"), "got: {debug}");
    }
}
