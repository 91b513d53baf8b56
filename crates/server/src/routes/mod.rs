//! API route handlers
//!
//! - `health`: liveness probe, Prometheus metrics and service info
//! - `verify`: fingerprint verification

pub mod health;
pub mod verify;

use crate::error::ServerError;

/// 404 Not Found handler
///
/// Unknown routes get the same JSON error shape as the API.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
