//! reqwest-backed transport
//!
//! Redirects are never followed: the provider's token and resource endpoints
//! do not expect client-side redirect chasing, and a 3xx is surfaced to the
//! caller as a `Success` outcome carrying the redirect response itself.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::debug;

use crate::{HttpOutcome, HttpRequest, Transport, TransportError};

/// Production transport over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with no redirect following and no request timeout.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(None)
    }

    /// Build a transport with an optional per-request timeout.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client. Its redirect policy is left as configured.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: HttpRequest) -> Pin<Box<dyn Future<Output = HttpOutcome> + Send + '_>> {
        Box::pin(async move {
            let HttpRequest {
                method,
                url,
                headers,
                body,
            } = request;

            let response = match self
                .client
                .request(method.clone(), &url)
                .headers(headers)
                .body(body)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    debug!(%method, %url, error = %e, "http exchange failed");
                    return HttpOutcome::TransportFailure(e.into());
                }
            };

            let status = response.status();
            let headers = response.headers().clone();
            match response.bytes().await {
                Ok(body) => {
                    debug!(%method, %url, status = status.as_u16(), bytes = body.len(), "http exchange complete");
                    HttpOutcome::classify(status, headers, body)
                }
                Err(e) => {
                    debug!(%method, %url, status = status.as_u16(), error = %e, "failed to read response body");
                    HttpOutcome::TransportFailure(e.into())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HeaderMap, Method, StatusCode};
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn success_reads_full_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/number-verification/verify"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"devicePhoneNumberVerified":true}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let outcome = transport
            .execute(
                HttpRequest::new(Method::POST, format!("{}/number-verification/verify", server.uri()))
                    .body(r#"{"phoneNumber":"+555123456789"}"#),
            )
            .await;

        match outcome {
            HttpOutcome::Success { status, body } => {
                assert_eq!(status, StatusCode::OK);
                assert_eq!(&body[..], br#"{"devicePhoneNumberVerified":true}"#);
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn headers_and_body_are_sent_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .and(header("authorization", "Basic aWQ6c2VjcmV0"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("grant_type=client_credentials&scope=magic-auth"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Basic aWQ6c2VjcmV0".parse().unwrap());
        headers.insert(
            "content-type",
            "application/x-www-form-urlencoded".parse().unwrap(),
        );

        let transport = ReqwestTransport::new().unwrap();
        let outcome = transport
            .execute(
                HttpRequest::new(Method::POST, format!("{}/oauth2/token", server.uri()))
                    .headers(headers)
                    .body("grant_type=client_credentials&scope=magic-auth"),
            )
            .await;

        assert!(matches!(outcome, HttpOutcome::Success { .. }), "got {outcome:?}");
    }

    #[tokio::test]
    async fn error_status_carries_body_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sim-swap/check"))
            .respond_with(
                ResponseTemplate::new(400)
                    .insert_header("x-request-id", "req_42")
                    .set_body_string(r#"{"code":"INVALID_ARGUMENT"}"#),
            )
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let outcome = transport
            .execute(HttpRequest::new(
                Method::POST,
                format!("{}/sim-swap/check", server.uri()),
            ))
            .await;

        match outcome {
            HttpOutcome::ClientOrServerError {
                status,
                body,
                headers,
            } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(&body[..], br#"{"code":"INVALID_ARGUMENT"}"#);
                assert_eq!(headers.get("x-request-id").unwrap(), "req_42");
            }
            other => panic!("expected ClientOrServerError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn redirects_are_not_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/start"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/landing"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/landing"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let outcome = transport
            .execute(HttpRequest::new(Method::GET, format!("{}/start", server.uri())))
            .await;

        assert_eq!(outcome.status(), Some(StatusCode::FOUND));
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_failure() {
        // Port 1 on loopback is never listening in test environments
        let transport = ReqwestTransport::new().unwrap();
        let outcome = transport
            .execute(HttpRequest::new(Method::POST, "http://127.0.0.1:1/oauth2/token"))
            .await;

        assert!(
            matches!(outcome, HttpOutcome::TransportFailure(_)),
            "got {outcome:?}"
        );
    }
}
