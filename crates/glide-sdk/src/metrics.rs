//! Client-side counters
//!
//! Recorded through the `metrics` facade; the application installs whatever
//! recorder it exports with. Without one these calls are no-ops.
//!
//! - `glide_api_requests_total` (counter): labels `service`, `outcome`
//! - `glide_token_grants_total` (counter): labels `grant_type`, `outcome`,
//!   recorded by the session layer
//! - `glide_session_cache_hits_total` (counter), recorded by the session layer

/// Record one resource-endpoint exchange.
///
/// `outcome` is the transport classification label (`success`,
/// `client_error`, `server_error`, `transport_failure`).
pub fn record_api_request(service: &'static str, outcome: &'static str) {
    metrics::counter!("glide_api_requests_total", "service" => service, "outcome" => outcome)
        .increment(1);
}
