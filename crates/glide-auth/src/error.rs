//! Error types for session acquisition

use std::sync::Arc;

use transport::{StatusCode, TransportError};

/// Errors from session acquisition.
///
/// Cloneable: a single in-flight grant hands the same result to every caller
/// that was waiting on it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("client id and client secret are required to acquire a session")]
    MissingCredentials,

    #[error("an authorization code is required to acquire a session")]
    MissingAuthCode,

    #[error("session acquisition failed: {0}")]
    SessionAcquisitionFailed(#[source] GrantFailure),
}

/// Why a grant exchange with the token endpoint failed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GrantFailure {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("token endpoint returned {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("invalid token response: {0}")]
    InvalidResponse(#[source] Arc<serde_json::Error>),

    #[error("token lifetime of {expires_in}s does not exceed the {margin_secs}s renewal margin")]
    ShortLived { expires_in: u64, margin_secs: u64 },

    #[error("token lifetime of {expires_in}s is out of range")]
    LifetimeOutOfRange { expires_in: u64 },

    #[error("grant task ended without a result")]
    Interrupted,
}

impl GrantFailure {
    /// Status returned by the token endpoint, when it answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GrantFailure::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<GrantFailure> for Error {
    fn from(failure: GrantFailure) -> Self {
        Error::SessionAcquisitionFailed(failure)
    }
}

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn rejected_grant_display_includes_status_and_body() {
        let err = Error::from(GrantFailure::Rejected {
            status: StatusCode::UNAUTHORIZED,
            body: r#"{"error":"invalid_client"}"#.into(),
        });
        let msg = err.to_string();
        assert!(msg.starts_with("session acquisition failed:"), "got: {msg}");
        assert!(msg.contains("401"), "got: {msg}");
        assert!(msg.contains("invalid_client"), "got: {msg}");
    }

    #[test]
    fn acquisition_failure_exposes_cause_as_source() {
        let err = Error::SessionAcquisitionFailed(GrantFailure::ShortLived {
            expires_in: 30,
            margin_secs: 60,
        });
        let source = err.source().expect("cause must be preserved");
        assert!(source.to_string().contains("30s"));
    }

    #[test]
    fn grant_failure_status_only_for_rejections() {
        let rejected = GrantFailure::Rejected {
            status: StatusCode::BAD_REQUEST,
            body: String::new(),
        };
        assert_eq!(rejected.status(), Some(StatusCode::BAD_REQUEST));
        let short = GrantFailure::ShortLived {
            expires_in: 1,
            margin_secs: 60,
        };
        assert_eq!(short.status(), None);
    }
}
