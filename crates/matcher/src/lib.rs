//! # Fingerprint Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` turns two raw fingerprint images into one similarity score. It
//! owns image decoding, template extraction and scoring, and hides them
//! behind the [`FingerprintMatcher`] trait so the verification service can
//! run against any backend, including deterministic test doubles.
//!
//! ## Core Types
//!
//! - [`FingerprintMatcher`]: the backend seam, one operation
//!   `score(probe, candidate)`.
//! - [`TemplateMatcher`]: default backend. Decodes PNG/JPEG/BMP/WebP at an
//!   assumed 500 DPI, extracts a block ridge field (orientation and spacing)
//!   and scores the best alignment of the two fields on a 0–100 scale.
//! - [`Matcher`]: adapter used by callers. [`Matcher::evaluate`] returns a
//!   tagged [`MatchOutcome`]; [`Matcher::verify`] flattens failures to
//!   [`FALLBACK_SCORE`].
//!
//! ## Failure policy
//!
//! A malformed image, an unsupported format or a backend panic never surfaces
//! as an error from [`Matcher::verify`]: it is reported as a score of `0.0`,
//! indistinguishable on the wire from a genuine non-match. The reason is
//! logged at `warn` and remains visible through [`Matcher::evaluate`].
//!
//! ## Example Usage
//!
//! ```
//! use matcher::demo_utils::demo_fingerprint_png;
//! use matcher::{Matcher, MatchOutcome};
//!
//! let png = demo_fingerprint_png();
//! let matcher = Matcher::default();
//!
//! match matcher.evaluate(&png, &png) {
//!     MatchOutcome::Scored(score) => assert!(score >= 40.0),
//!     MatchOutcome::Failed(err) => panic!("comparison failed: {err}"),
//! }
//! assert_eq!(matcher.verify(b"not an image", &png), 0.0);
//! ```

pub mod engine;
pub mod template;
pub mod types;

#[doc(hidden)]
pub mod demo_utils;

pub use crate::engine::{FingerprintMatcher, Matcher, ProbeIndex, TemplateMatcher};
pub use crate::template::{BlockFeature, FingerprintImage, FingerprintTemplate};
pub use crate::types::{
    MatchError, MatchOutcome, MatcherConfig, Side, FALLBACK_SCORE, TEMPLATE_DPI,
};
