use std::sync::Arc;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use bioverify::{
    verify_bytes, verify_encoded, FingerprintMatcher, MatchError, MatchOutcome, Matcher,
    PipelineError, Side, FALLBACK_SCORE, MATCH_THRESHOLD,
};
use matcher::demo_utils::{demo_fingerprint_png, encode_png, ridge_pattern, whorl_pattern};

struct FixedScore(f64);

impl FingerprintMatcher for FixedScore {
    fn score(&self, _probe: &[u8], _candidate: &[u8]) -> Result<f64, MatchError> {
        Ok(self.0)
    }
}

#[test]
fn identical_fingerprints_match() {
    let b64 = STANDARD.encode(demo_fingerprint_png());
    let report = verify_encoded(&Matcher::default(), &b64, &b64, MATCH_THRESHOLD).unwrap();

    assert!(report.verdict.is_match);
    assert!(report.verdict.score >= MATCH_THRESHOLD);
    assert!(matches!(report.outcome, MatchOutcome::Scored(_)));
}

#[test]
fn alphabet_choice_does_not_change_the_score() {
    let probe = encode_png(&whorl_pattern(224, 224, 9.0));
    let candidate = encode_png(&ridge_pattern(224, 224, 20.0, 9.0));
    let matcher = Matcher::default();

    let standard = verify_encoded(
        &matcher,
        &STANDARD.encode(&probe),
        &STANDARD.encode(&candidate),
        MATCH_THRESHOLD,
    )
    .unwrap();
    let url_safe = verify_encoded(
        &matcher,
        &URL_SAFE_NO_PAD.encode(&probe),
        &URL_SAFE_NO_PAD.encode(&candidate),
        MATCH_THRESHOLD,
    )
    .unwrap();

    assert_eq!(standard, url_safe);
}

#[test]
fn undecodable_images_score_zero_without_error() {
    let report = verify_encoded(
        &Matcher::default(),
        &STANDARD.encode(b"random bytes, not an image"),
        &STANDARD.encode([7u8; 512]),
        MATCH_THRESHOLD,
    )
    .unwrap();

    assert_eq!(report.verdict.score, FALLBACK_SCORE);
    assert!(!report.verdict.is_match);
    assert!(report.outcome.is_failed());
}

#[test]
fn probe_is_decoded_first() {
    let err = verify_encoded(&Matcher::default(), "***", "%%%", MATCH_THRESHOLD).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::InvalidBase64 {
            side: Side::Probe,
            ..
        }
    ));
}

#[test]
fn bad_candidate_is_named_in_the_error() {
    let err = verify_encoded(&Matcher::default(), "aGk=", "a b c", MATCH_THRESHOLD).unwrap_err();
    assert!(
        err.to_string().starts_with("invalid base64 in candidate"),
        "message = {err}"
    );
}

#[test]
fn threshold_is_applied_to_backend_score() {
    let at = Matcher::new(Arc::new(FixedScore(40.0)));
    let below = Matcher::new(Arc::new(FixedScore(39.5)));

    assert!(verify_bytes(&at, b"p", b"c", MATCH_THRESHOLD).verdict.is_match);
    assert!(!verify_bytes(&below, b"p", b"c", MATCH_THRESHOLD).verdict.is_match);
}
