use crate::error::ServerError;
use crate::state::{ServerMetadata, ServerState};
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

/// Force the start time to be recorded at boot rather than on first use.
pub fn mark_start() {
    once_cell::sync::Lazy::force(&SERVER_START_TIME);
}

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Health check endpoint (liveness)
///
/// Always 200 with a plain `OK`; the matcher is not consulted.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Service info endpoint (`GET /`)
pub async fn api_info(State(state): State<Arc<ServerState>>) -> Json<ServerMetadata> {
    Json(ServerMetadata {
        name: "bioverify".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime_seconds(),
        matcher: state.matcher.backend_name().to_string(),
        match_threshold: state.config.match_threshold,
        endpoints: vec!["/api/verify", "/health", "/metrics"],
    })
}

/// Prometheus metrics endpoint
///
/// 404 when no recorder was installed at startup.
pub async fn metrics(State(state): State<Arc<ServerState>>) -> Response {
    match &state.prometheus {
        Some(handle) => (
            [(CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => ServerError::NotFound.into_response(),
    }
}
