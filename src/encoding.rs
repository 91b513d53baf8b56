//! Base64 intake for fingerprint images.
//!
//! Callers send either the standard or the URL-safe alphabet, with or
//! without padding. Both are folded onto the standard alphabet before
//! decoding, so the same image always yields the same bytes.

use std::borrow::Cow;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use matcher::Side;

use crate::PipelineError;

/// Standard alphabet, padding optional, non-zero trailing bits tolerated.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Rewrite the URL-safe characters `-` and `_` to `+` and `/`.
///
/// Idempotent; input without URL-safe characters is returned borrowed.
pub fn normalize_base64(encoded: &str) -> Cow<'_, str> {
    if !encoded.contains(['-', '_']) {
        return Cow::Borrowed(encoded);
    }
    Cow::Owned(
        encoded
            .chars()
            .map(|c| match c {
                '-' => '+',
                '_' => '/',
                other => other,
            })
            .collect(),
    )
}

/// Normalize and decode one request field.
///
/// An empty string decodes to an empty buffer.
pub fn decode_fingerprint(side: Side, encoded: &str) -> Result<Vec<u8>, PipelineError> {
    let normalized = normalize_base64(encoded);
    LENIENT_STANDARD
        .decode(normalized.as_bytes())
        .map_err(|err| PipelineError::InvalidBase64 {
            side,
            reason: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};

    #[test]
    fn normalization_rewrites_url_safe_characters() {
        assert_eq!(normalize_base64("ab-_cd"), "ab+/cd");
        assert!(matches!(normalize_base64("ab+/cd"), Cow::Borrowed(_)));
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_base64("-_-_x=").into_owned();
        let twice = normalize_base64(&once).into_owned();
        assert_eq!(once, twice);
    }

    #[test]
    fn standard_and_url_safe_decode_to_same_bytes() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        let standard = STANDARD.encode(&bytes);
        let url_safe = URL_SAFE_NO_PAD.encode(&bytes);
        assert_ne!(standard, url_safe);

        let a = decode_fingerprint(Side::Probe, &standard).unwrap();
        let b = decode_fingerprint(Side::Probe, &url_safe).unwrap();
        assert_eq!(a, bytes);
        assert_eq!(a, b);
    }

    #[test]
    fn padding_is_optional() {
        assert_eq!(decode_fingerprint(Side::Probe, "aGk=").unwrap(), b"hi");
        assert_eq!(decode_fingerprint(Side::Probe, "aGk").unwrap(), b"hi");
    }

    #[test]
    fn empty_field_decodes_to_empty_buffer() {
        assert!(decode_fingerprint(Side::Candidate, "").unwrap().is_empty());
    }

    #[test]
    fn foreign_characters_are_rejected() {
        for input in ["not base64!", "aGk*", "aG k=", "data:image/png;base64,aGk="] {
            let err = decode_fingerprint(Side::Candidate, input).unwrap_err();
            assert!(
                matches!(
                    err,
                    PipelineError::InvalidBase64 {
                        side: Side::Candidate,
                        ..
                    }
                ),
                "{input:?} should be rejected"
            );
        }
    }
}
