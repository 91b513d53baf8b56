//! Prometheus counters for the verification endpoint.
//!
//! Recording goes through the `metrics` facade and is a no-op until
//! [`install_prometheus`] has installed a global recorder.

use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Final classification of one `/api/verify` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Match,
    NoMatch,
    MatcherFailure,
    BadRequest,
    InternalError,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Match => "match",
            Outcome::NoMatch => "no_match",
            Outcome::MatcherFailure => "matcher_failure",
            Outcome::BadRequest => "bad_request",
            Outcome::InternalError => "internal_error",
        }
    }
}

pub fn record_outcome(outcome: Outcome) {
    metrics::counter!("bioverify_requests_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_match_duration(elapsed: Duration) {
    metrics::histogram!("bioverify_match_duration_seconds").record(elapsed.as_secs_f64());
}

/// Install the process-wide Prometheus recorder.
///
/// Fails if another recorder is already installed.
pub fn install_prometheus() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    metrics::describe_counter!(
        "bioverify_requests_total",
        "Verification requests by final outcome"
    );
    metrics::describe_histogram!(
        "bioverify_match_duration_seconds",
        metrics::Unit::Seconds,
        "Time spent decoding and matching one fingerprint pair"
    );
    Ok(handle)
}
