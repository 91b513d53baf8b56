use std::backtrace::Backtrace;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bioverify::PipelineError;

use crate::routes::verify::VerifyResponse;
use crate::telemetry::{record_outcome, Outcome};

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("missing fingerprint data: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error(transparent)]
    InvalidBase64(#[from] PipelineError),

    /// Anything the caller could not have fixed; `trace` is the rendered
    /// stack captured where the error was built.
    #[error("internal server error: {message}")]
    Internal { message: String, trace: String },

    #[error("not found")]
    NotFound,
}

impl ServerError {
    /// Build a [`ServerError::Internal`], capturing the current stack.
    pub fn internal(message: impl Into<String>) -> Self {
        ServerError::Internal {
            message: message.into(),
            trace: Backtrace::force_capture().to_string(),
        }
    }

    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::MissingFields(_) | ServerError::InvalidBase64(_) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    fn error_code(&self) -> &'static str {
        match self {
            ServerError::MissingFields(_) => "MISSING_FIELDS",
            ServerError::InvalidBase64(_) => "INVALID_BASE64",
            ServerError::Internal { .. } => "INTERNAL_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if let ServerError::Internal { trace, .. } = &self {
            tracing::error!(
                code = self.error_code(),
                error = %message,
                backtrace = %trace,
                "request failed"
            );
            record_outcome(Outcome::InternalError);
        } else if status == StatusCode::BAD_REQUEST {
            tracing::info!(code = self.error_code(), error = %message, "rejected request");
            record_outcome(Outcome::BadRequest);
        }

        (status, Json(VerifyResponse::failure(message))).into_response()
    }
}

/// A body that does not parse into a request is a server-side failure; only
/// missing fields and bad base64 are answered with 400.
impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        ServerError::internal(format!("malformed JSON body: {err}"))
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServerError::internal(format!("verification task failed: {err}"))
    }
}
