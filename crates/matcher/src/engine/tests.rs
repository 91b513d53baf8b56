use super::*;
use crate::demo_utils::{
    demo_fingerprint_png, encode_bmp, encode_png, flat_image, ridge_pattern, whorl_pattern,
};
use crate::types::FALLBACK_SCORE;

const THRESHOLD: f64 = 40.0;

struct FixedScore(f64);

impl FingerprintMatcher for FixedScore {
    fn score(&self, _probe: &[u8], _candidate: &[u8]) -> Result<f64, MatchError> {
        Ok(self.0)
    }
}

struct Panicking;

impl FingerprintMatcher for Panicking {
    fn score(&self, _probe: &[u8], _candidate: &[u8]) -> Result<f64, MatchError> {
        panic!("decoder blew up")
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

#[test]
fn self_comparison_clears_threshold() {
    let png = demo_fingerprint_png();
    let matcher = Matcher::default();

    let outcome = matcher.evaluate(&png, &png);
    let MatchOutcome::Scored(score) = outcome else {
        panic!("expected a score, got {outcome:?}");
    };
    assert!(score >= THRESHOLD, "score = {score}");
    assert!(score > 99.0, "self comparison should be near perfect, got {score}");
}

#[test]
fn whorl_self_comparison_clears_threshold() {
    let png = encode_png(&whorl_pattern(240, 240, 9.0));
    let score = Matcher::default().verify(&png, &png);
    assert!(score >= THRESHOLD, "score = {score}");
}

#[test]
fn perpendicular_ridges_do_not_match() {
    let probe = encode_png(&ridge_pattern(192, 192, 0.0, 9.0));
    let candidate = encode_png(&ridge_pattern(192, 192, 90.0, 9.0));
    let score = Matcher::default().verify(&probe, &candidate);
    assert!(score < THRESHOLD, "score = {score}");
}

#[test]
fn different_ridge_spacing_does_not_match() {
    let probe = encode_png(&ridge_pattern(192, 192, 0.0, 9.0));
    let candidate = encode_png(&ridge_pattern(192, 192, 0.0, 15.0));
    let score = Matcher::default().verify(&probe, &candidate);
    assert!(score < THRESHOLD, "score = {score}");
}

#[test]
fn different_whorl_spacing_does_not_match() {
    let probe = encode_png(&whorl_pattern(240, 240, 9.0));
    let candidate = encode_png(&whorl_pattern(240, 240, 14.0));
    let score = Matcher::default().verify(&probe, &candidate);
    assert!(score < THRESHOLD, "score = {score}");
}

#[test]
fn moderately_rotated_ridges_do_not_match() {
    let probe = encode_png(&ridge_pattern(192, 192, 0.0, 9.0));
    let candidate = encode_png(&ridge_pattern(192, 192, 25.0, 9.0));
    let score = Matcher::default().verify(&probe, &candidate);
    assert!(score < THRESHOLD, "score = {score}");
}

#[test]
fn small_distortions_still_match() {
    let probe = encode_png(&ridge_pattern(192, 192, 0.0, 9.0));
    let matcher = Matcher::default();

    let rotated = matcher.verify(&probe, &encode_png(&ridge_pattern(192, 192, 8.0, 9.0)));
    assert!(rotated >= THRESHOLD, "8 degree rotation scored {rotated}");

    let stretched = matcher.verify(&probe, &encode_png(&ridge_pattern(192, 192, 0.0, 9.5)));
    assert!(stretched >= THRESHOLD, "9.5px spacing scored {stretched}");
}

#[test]
fn oversized_image_is_masked_without_decoding() {
    let huge = encode_png(&flat_image(12_000, 64, 0));
    let matcher = Matcher::default();

    let outcome = matcher.evaluate(&huge, &demo_fingerprint_png());
    assert_eq!(
        outcome,
        MatchOutcome::Failed(MatchError::ImageTooLarge {
            side: Side::Probe,
            max: 2048
        })
    );
    assert_eq!(outcome.score_or_fallback(), FALLBACK_SCORE);
}

#[test]
fn format_does_not_change_the_score() {
    let image = ridge_pattern(192, 160, 30.0, 9.0);
    let matcher = Matcher::default();
    let from_png = matcher.verify(&encode_png(&image), &encode_png(&image));
    let from_bmp = matcher.verify(&encode_bmp(&image), &encode_bmp(&image));
    assert!((from_png - from_bmp).abs() < 1e-3, "png {from_png} vs bmp {from_bmp}");
}

#[test]
fn scoring_is_deterministic() {
    let probe = encode_png(&whorl_pattern(200, 200, 9.0));
    let candidate = encode_png(&ridge_pattern(200, 200, 45.0, 9.0));
    let matcher = Matcher::default();
    let first = matcher.verify(&probe, &candidate);
    let second = matcher.verify(&probe, &candidate);
    assert_eq!(first, second);
}

#[test]
fn random_bytes_fail_and_fall_back() {
    let noise: Vec<u8> = (0..4096u32).map(|i| (i.wrapping_mul(2654435761) >> 13) as u8).collect();
    let matcher = Matcher::default();

    let outcome = matcher.evaluate(&noise, &noise);
    assert!(matches!(
        outcome,
        MatchOutcome::Failed(MatchError::Decode {
            side: Side::Probe,
            ..
        })
    ));
    assert_eq!(matcher.verify(&noise, &noise), FALLBACK_SCORE);
}

#[test]
fn candidate_failure_is_attributed_to_candidate() {
    let probe = demo_fingerprint_png();
    let candidate = encode_png(&flat_image(128, 128, 30));
    let outcome = Matcher::default().evaluate(&probe, &candidate);
    assert_eq!(
        outcome,
        MatchOutcome::Failed(MatchError::NoRidgeArea {
            side: Side::Candidate
        })
    );
}

#[test]
fn empty_input_falls_back() {
    let matcher = Matcher::default();
    let outcome = matcher.evaluate(&[], &demo_fingerprint_png());
    assert_eq!(
        outcome,
        MatchOutcome::Failed(MatchError::EmptyImage { side: Side::Probe })
    );
    assert_eq!(outcome.score_or_fallback(), FALLBACK_SCORE);
}

#[test]
fn custom_backend_score_passes_through() {
    let matcher = Matcher::new(Arc::new(FixedScore(73.25)));
    assert_eq!(matcher.backend_name(), "custom");
    assert_eq!(matcher.evaluate(b"a", b"b"), MatchOutcome::Scored(73.25));
}

#[test]
fn panicking_backend_is_reported_as_failure() {
    let matcher = Matcher::new(Arc::new(Panicking));
    let outcome = matcher.evaluate(b"a", b"b");
    match outcome {
        MatchOutcome::Failed(MatchError::Backend(msg)) => {
            assert!(msg.contains("decoder blew up"), "message = {msg}");
        }
        other => panic!("expected backend failure, got {other:?}"),
    }
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = MatcherConfig {
        block_size: 1,
        ..Default::default()
    };
    assert!(matches!(
        Matcher::with_config(cfg),
        Err(MatchError::InvalidConfig(_))
    ));
}

#[test]
fn probe_index_is_reusable() {
    let matcher = TemplateMatcher::default();
    let probe = matcher
        .template(&demo_fingerprint_png(), Side::Probe)
        .unwrap();
    let same = matcher
        .template(&demo_fingerprint_png(), Side::Candidate)
        .unwrap();
    let rotated = matcher
        .template(&encode_png(&ridge_pattern(256, 320, 90.0, 9.0)), Side::Candidate)
        .unwrap();

    let index = matcher.index(&probe);
    assert!(index.match_template(&same) > index.match_template(&rotated));
}
