use crate::config::ServerConfig;
use bioverify::Matcher;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
///
/// Everything here is read-only after startup; requests share nothing else.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Matcher adapter (shared across requests, holds no per-request data)
    pub matcher: Matcher,

    /// Renders `/metrics` when a Prometheus recorder is installed
    pub prometheus: Option<PrometheusHandle>,
}

impl ServerState {
    /// Create new server state with the default template matcher
    pub fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let matcher = Matcher::with_config(config.matcher.clone())?;
        Ok(Self::with_matcher(config, matcher))
    }

    /// Create server state around an arbitrary matcher backend
    pub fn with_matcher(config: ServerConfig, matcher: Matcher) -> Self {
        Self {
            config: Arc::new(config),
            matcher,
            prometheus: None,
        }
    }

    /// Attach the Prometheus handle used by `/metrics`
    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}

/// Server metadata for the info endpoint
#[derive(Debug, serde::Serialize)]
pub struct ServerMetadata {
    pub name: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub matcher: String,
    pub match_threshold: f64,
    pub endpoints: Vec<&'static str>,
}
