//! Error types for API calls

use transport::{HeaderMap, StatusCode, TransportError};

/// Errors surfaced by service clients and the request executor.
///
/// Nothing is retried internally; each failure reaches the caller intact,
/// with its original cause reachable through `source()`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] common::Error),

    #[error(transparent)]
    Auth(#[from] glide_auth::Error),

    #[error("API returned {status}: {body}")]
    Api {
        status: StatusCode,
        body: String,
        headers: HeaderMap,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The exchange succeeded but the body did not have the expected shape.
    #[error("failed to decode API response: {source}")]
    ResponseDecode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Flat classification of an `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    MissingCredentials,
    MissingAuthCode,
    SessionAcquisitionFailed,
    ResponseDecode,
    Api,
    Transport,
    InvalidRequest,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Configuration,
            Error::Auth(glide_auth::Error::Configuration(_)) => ErrorKind::Configuration,
            Error::Auth(glide_auth::Error::MissingCredentials) => ErrorKind::MissingCredentials,
            Error::Auth(glide_auth::Error::MissingAuthCode) => ErrorKind::MissingAuthCode,
            Error::Auth(glide_auth::Error::SessionAcquisitionFailed(_)) => {
                ErrorKind::SessionAcquisitionFailed
            }
            Error::Api { .. } => ErrorKind::Api,
            Error::Transport(_) => ErrorKind::Transport,
            Error::ResponseDecode { .. } => ErrorKind::ResponseDecode,
            Error::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    /// HTTP status of an API error response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw body of an API error or an undecodable success response.
    pub fn body(&self) -> Option<&str> {
        match self {
            Error::Api { body, .. } | Error::ResponseDecode { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Session could not be obtained, or the API refused the bearer token.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Error::Auth(_) => true,
            Error::Api { status, .. } => {
                *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
            }
            _ => false,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| s.is_client_error())
    }

    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| s.is_server_error())
    }
}

/// Result alias for API calls.
pub type Result<T> = std::result::Result<T, Error>;
