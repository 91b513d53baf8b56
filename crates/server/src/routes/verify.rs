use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use crate::telemetry::{record_match_duration, record_outcome, Outcome};
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use bioverify::{verify_encoded, MatchOutcome, Verdict};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Verification request
///
/// Both fields are base64 images in the standard or URL-safe alphabet.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyRequest {
    /// Fingerprint being checked
    #[serde(default)]
    pub probe: Option<String>,

    /// Stored reference fingerprint
    #[serde(default)]
    pub candidate: Option<String>,
}

impl VerifyRequest {
    /// Split into `(probe, candidate)`, naming every absent field.
    pub fn into_fields(self) -> ServerResult<(String, String)> {
        match (self.probe, self.candidate) {
            (Some(probe), Some(candidate)) => Ok((probe, candidate)),
            (probe, candidate) => {
                let mut missing = Vec::with_capacity(2);
                if probe.is_none() {
                    missing.push("probe");
                }
                if candidate.is_none() {
                    missing.push("candidate");
                }
                Err(ServerError::MissingFields(missing))
            }
        }
    }
}

/// Verification response
///
/// Success carries `match` and `score`. Failures carry `error` with
/// `match = false` and `score = 0.0` as placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyResponse {
    #[serde(rename = "match")]
    pub is_match: bool,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyResponse {
    pub fn scored(verdict: Verdict) -> Self {
        Self {
            is_match: verdict.is_match,
            score: verdict.score,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            is_match: false,
            score: 0.0,
            error: Some(message.into()),
        }
    }
}

/// Compare a probe fingerprint against a candidate.
///
/// The body is parsed as JSON whatever its `Content-Type`. Decoding and
/// matching run on the blocking pool. A comparison the matcher could not
/// complete is answered with 200 and score 0.0, not an error status.
pub async fn verify_fingerprints(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> ServerResult<Json<VerifyResponse>> {
    let request: VerifyRequest = serde_json::from_slice(&body)?;
    drop(body);
    let (probe, candidate) = request.into_fields()?;

    let matcher = state.matcher.clone();
    let threshold = state.config.match_threshold;
    let start = Instant::now();
    let report =
        tokio::task::spawn_blocking(move || verify_encoded(&matcher, &probe, &candidate, threshold))
            .await??;
    record_match_duration(start.elapsed());

    let outcome = match (&report.outcome, report.verdict.is_match) {
        (MatchOutcome::Failed(_), _) => Outcome::MatcherFailure,
        (MatchOutcome::Scored(_), true) => Outcome::Match,
        (MatchOutcome::Scored(_), false) => Outcome::NoMatch,
    };
    record_outcome(outcome);

    tracing::info!(
        score = report.verdict.score,
        matched = report.verdict.is_match,
        outcome = outcome.as_str(),
        duration_ms = start.elapsed().as_millis() as u64,
        "fingerprint verification completed"
    );

    Ok(Json(VerifyResponse::scored(report.verdict)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_fields_present() {
        let request = VerifyRequest {
            probe: Some("cA==".into()),
            candidate: Some("Yw==".into()),
        };
        assert_eq!(
            request.into_fields().unwrap(),
            ("cA==".to_string(), "Yw==".to_string())
        );
    }

    #[test]
    fn every_missing_field_is_reported() {
        let err = VerifyRequest::default().into_fields().unwrap_err();
        assert!(matches!(
            err,
            ServerError::MissingFields(ref fields) if fields == &["probe", "candidate"]
        ));

        let err = VerifyRequest {
            probe: Some("cA==".into()),
            candidate: None,
        }
        .into_fields()
        .unwrap_err();
        assert!(matches!(
            err,
            ServerError::MissingFields(ref fields) if fields == &["candidate"]
        ));
    }

    #[test]
    fn null_fields_deserialize_as_missing() {
        let request: VerifyRequest =
            serde_json::from_str(r#"{"probe": null, "extra": 1}"#).unwrap();
        assert!(request.probe.is_none());
        assert!(request.candidate.is_none());
    }

    #[test]
    fn success_body_has_no_error_key() {
        let body =
            serde_json::to_value(VerifyResponse::scored(Verdict::from_score(72.0, 40.0))).unwrap();
        assert_eq!(body, serde_json::json!({"match": true, "score": 72.0}));
    }

    #[test]
    fn failure_body_has_placeholders() {
        let body = serde_json::to_value(VerifyResponse::failure("nope")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"match": false, "score": 0.0, "error": "nope"})
        );
    }
}
