//! bioverify server - HTTP front door for fingerprint verification
//!
//! This crate exposes the [`bioverify`] pipeline over HTTP:
//!
//! - `POST /api/verify` - compare two base64 fingerprint images
//! - `GET /health` - liveness probe, always `200 OK`
//! - `GET /metrics` - Prometheus metrics
//! - `GET /` - service info
//!
//! # Request handling
//!
//! ```text
//! {"probe": "<base64>", "candidate": "<base64>"}
//!   -> 200 {"match": true, "score": 87.4}
//!   -> 400 {"match": false, "score": 0.0, "error": "missing fingerprint data: candidate"}
//!   -> 400 {"match": false, "score": 0.0, "error": "invalid base64 in probe: ..."}
//!   -> 500 {"match": false, "score": 0.0, "error": "internal server error: ..."}
//! ```
//!
//! Images the matcher cannot process are not errors: they score `0.0` and
//! the request succeeds with `match = false`. Bodies over the configured cap
//! (50 MiB by default) are refused with a plain 413 before parsing.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;
pub mod telemetry;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
