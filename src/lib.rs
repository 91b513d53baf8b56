//! Workspace umbrella crate for fingerprint verification.
//!
//! This crate stitches base64 intake, the [`matcher`] adapter and the match
//! decision together so the HTTP layer can verify a request with a single
//! call:
//!
//! ```
//! use base64::Engine as _;
//! use bioverify::{verify_encoded, MATCH_THRESHOLD};
//! use matcher::demo_utils::demo_fingerprint_png;
//! use matcher::Matcher;
//!
//! let b64 = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(demo_fingerprint_png());
//! let report = verify_encoded(&Matcher::default(), &b64, &b64, MATCH_THRESHOLD).unwrap();
//! assert!(report.verdict.is_match);
//! ```
//!
//! Only malformed base64 is an error here. Anything that goes wrong inside
//! the matcher is reported through [`VerifyReport::outcome`] and scored as
//! [`matcher::FALLBACK_SCORE`].

mod encoding;
mod verdict;

pub use crate::encoding::{decode_fingerprint, normalize_base64};
pub use crate::verdict::{Verdict, MATCH_THRESHOLD};
pub use matcher::{
    FingerprintMatcher, MatchError, MatchOutcome, Matcher, MatcherConfig, Side, FALLBACK_SCORE,
    TEMPLATE_DPI,
};

use thiserror::Error;

/// Errors that can occur before a comparison is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("invalid base64 in {side}: {reason}")]
    InvalidBase64 { side: Side, reason: String },
}

/// Everything one verification produced.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyReport {
    /// The decision reported to the caller.
    pub verdict: Verdict,
    /// The matcher result before fallback; tells a failed comparison apart
    /// from a genuine non-match.
    pub outcome: MatchOutcome,
}

/// Compare two decoded images and apply `threshold`.
pub fn verify_bytes(
    matcher: &Matcher,
    probe: &[u8],
    candidate: &[u8],
    threshold: f64,
) -> VerifyReport {
    let outcome = matcher.evaluate(probe, candidate);
    let score = outcome.score_or_fallback();
    VerifyReport {
        verdict: Verdict::from_score(score, threshold),
        outcome,
    }
}

/// Decode both base64 fields (probe first) and verify them.
pub fn verify_encoded(
    matcher: &Matcher,
    probe_b64: &str,
    candidate_b64: &str,
    threshold: f64,
) -> Result<VerifyReport, PipelineError> {
    let probe = decode_fingerprint(Side::Probe, probe_b64)?;
    let candidate = decode_fingerprint(Side::Candidate, candidate_b64)?;

    tracing::debug!(
        probe_bytes = probe.len(),
        candidate_bytes = candidate.len(),
        "decoded fingerprint images"
    );

    Ok(verify_bytes(matcher, &probe, &candidate, threshold))
}
