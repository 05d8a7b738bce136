//! Scripted in-memory transport for tests
//!
//! Responses are registered per URL path. Each route replays its queued
//! outcomes in order; the last outcome of a route repeats for any further
//! calls. Every request is recorded so tests can assert on call counts and
//! on exactly what was sent.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use crate::{Bytes, HeaderMap, HttpOutcome, HttpRequest, StatusCode, Transport, TransportError};

struct Route {
    path: String,
    outcomes: VecDeque<HttpOutcome>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response, so concurrent callers overlap in tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue an outcome for requests whose URL path ends with `path`.
    pub fn on(self, path: &str, outcome: HttpOutcome) -> Self {
        {
            let mut routes = self.routes.lock().unwrap();
            match routes.iter_mut().find(|r| r.path == path) {
                Some(route) => route.outcomes.push_back(outcome),
                None => routes.push(Route {
                    path: path.to_string(),
                    outcomes: VecDeque::from([outcome]),
                }),
            }
        }
        self
    }

    /// Every request seen so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests whose URL path ends with `path`.
    pub fn calls_to(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| url_path(&r.url).ends_with(path))
            .count()
    }

    fn next_outcome(&self, url: &str) -> HttpOutcome {
        let request_path = url_path(url);
        let mut routes = self.routes.lock().unwrap();
        let route = routes
            .iter_mut()
            .find(|r| request_path.ends_with(r.path.as_str()));
        match route {
            Some(route) if route.outcomes.len() > 1 => route
                .outcomes
                .pop_front()
                .unwrap_or_else(|| not_scripted(url)),
            Some(route) => route
                .outcomes
                .front()
                .cloned()
                .unwrap_or_else(|| not_scripted(url)),
            None => not_scripted(url),
        }
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: HttpRequest) -> Pin<Box<dyn Future<Output = HttpOutcome> + Send + '_>> {
        Box::pin(async move {
            let outcome = self.next_outcome(&request.url);
            self.requests.lock().unwrap().push(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            outcome
        })
    }
}

/// `200 OK` with the given body.
pub fn ok(body: impl Into<String>) -> HttpOutcome {
    HttpOutcome::Success {
        status: StatusCode::OK,
        body: Bytes::from(body.into()),
    }
}

/// Error status with the given body and no headers.
pub fn status(code: u16, body: impl Into<String>) -> HttpOutcome {
    HttpOutcome::ClientOrServerError {
        status: StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        body: Bytes::from(body.into()),
        headers: HeaderMap::new(),
    }
}

/// A connection reset before any response arrived.
pub fn connection_reset() -> HttpOutcome {
    HttpOutcome::TransportFailure(TransportError::new(std::io::Error::new(
        std::io::ErrorKind::ConnectionReset,
        "connection reset by peer",
    )))
}

fn not_scripted(url: &str) -> HttpOutcome {
    status(404, format!("no scripted response for {url}"))
}

/// Path portion of a URL, without scheme, host or query.
fn url_path(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme
        .find('/')
        .map_or("", |i| &without_scheme[i..]);
    path.split('?').next().unwrap_or(path)
}
