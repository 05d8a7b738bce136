//! Single-exchange HTTP transport
//!
//! Defines the `Transport` trait that decouples the session and request layers
//! from the HTTP stack. A transport performs exactly one round trip per call:
//! no retries, no redirect following. Every exchange is classified into an
//! `HttpOutcome` that callers must branch on:
//!
//! - `Success`: status below 400, full body read
//! - `ClientOrServerError`: status 400 or above, with raw body and headers so
//!   callers can extract provider-specific error payloads
//! - `TransportFailure`: DNS, TLS, connection reset, body read failure

pub mod error;
pub mod http;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use error::TransportError;
pub use http::ReqwestTransport;

pub use bytes::Bytes;
pub use reqwest::header::{self, HeaderMap};
pub use reqwest::{Method, StatusCode};

use std::future::Future;
use std::pin::Pin;

/// A fully-formed outbound request. Headers are sent verbatim.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// Classified result of one HTTP exchange.
#[derive(Debug, Clone)]
pub enum HttpOutcome {
    Success {
        status: StatusCode,
        body: Bytes,
    },
    ClientOrServerError {
        status: StatusCode,
        body: Bytes,
        headers: HeaderMap,
    },
    TransportFailure(TransportError),
}

impl HttpOutcome {
    /// Classify a completed exchange by status code.
    pub fn classify(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        if status.as_u16() < 400 {
            HttpOutcome::Success { status, body }
        } else {
            HttpOutcome::ClientOrServerError {
                status,
                body,
                headers,
            }
        }
    }

    /// Status code of the exchange, if one completed.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpOutcome::Success { status, .. }
            | HttpOutcome::ClientOrServerError { status, .. } => Some(*status),
            HttpOutcome::TransportFailure(_) => None,
        }
    }

    /// Outcome label for logging and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            HttpOutcome::Success { .. } => "success",
            HttpOutcome::ClientOrServerError { status, .. } if status.is_server_error() => {
                "server_error"
            }
            HttpOutcome::ClientOrServerError { .. } => "client_error",
            HttpOutcome::TransportFailure(_) => "transport_failure",
        }
    }
}

/// Executes a single HTTP exchange.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility
/// (`Arc<dyn Transport>` is shared by every session manager and executor).
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Pin<Box<dyn Future<Output = HttpOutcome> + Send + '_>>;
}
