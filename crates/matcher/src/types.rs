use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Resolution every template is normalized to.
///
/// Scanners are assumed to deliver 500 DPI images; the value is a calibration
/// constant and is never read from image metadata.
pub const TEMPLATE_DPI: u32 = 500;

/// Score reported when the matcher could not produce one.
pub const FALLBACK_SCORE: f64 = 0.0;

/// Tuning knobs for [`crate::TemplateMatcher`].
///
/// `MatcherConfig` is cheap to clone and serde-friendly so it can be embedded
/// in the server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatcherConfig {
    /// Resolution the input images are assumed to have.
    #[serde(default = "MatcherConfig::default_dpi")]
    pub dpi: u32,
    /// Side length in pixels of the square blocks the ridge field is
    /// sampled on.
    #[serde(default = "MatcherConfig::default_block_size")]
    pub block_size: u32,
    /// Largest translation, in blocks, tried when aligning two templates.
    #[serde(default = "MatcherConfig::default_max_shift")]
    pub max_shift: i32,
    /// Minimum grey-level variance for a block to count as ridge area.
    #[serde(default = "MatcherConfig::default_min_variance")]
    pub min_variance: f32,
    /// Minimum orientation coherence for a block to count as ridge area.
    #[serde(default = "MatcherConfig::default_min_coherence")]
    pub min_coherence: f32,
    /// Minimum number of overlapping ridge blocks for an alignment to score.
    #[serde(default = "MatcherConfig::default_min_overlap")]
    pub min_overlap: usize,
    /// Largest accepted width or height of an input image, in pixels.
    ///
    /// Checked against the image header before any pixel data is decoded.
    #[serde(default = "MatcherConfig::default_max_image_dimension")]
    pub max_image_dimension: u32,
}

impl MatcherConfig {
    pub(crate) fn default_dpi() -> u32 {
        TEMPLATE_DPI
    }

    pub(crate) fn default_block_size() -> u32 {
        16
    }

    pub(crate) fn default_max_shift() -> i32 {
        4
    }

    pub(crate) fn default_min_variance() -> f32 {
        100.0
    }

    pub(crate) fn default_min_coherence() -> f32 {
        0.2
    }

    pub(crate) fn default_min_overlap() -> usize {
        4
    }

    pub(crate) fn default_max_image_dimension() -> u32 {
        2048
    }

    /// Override the assumed input resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.dpi == 0 {
            return Err(MatchError::InvalidConfig("dpi must be > 0".into()));
        }
        if self.block_size < 3 {
            return Err(MatchError::InvalidConfig(format!(
                "block_size must be >= 3, got {}",
                self.block_size
            )));
        }
        if self.max_shift < 0 {
            return Err(MatchError::InvalidConfig(format!(
                "max_shift must be >= 0, got {}",
                self.max_shift
            )));
        }
        if !(0.0..=1.0).contains(&self.min_coherence) {
            return Err(MatchError::InvalidConfig(format!(
                "min_coherence must be within [0, 1], got {}",
                self.min_coherence
            )));
        }
        if self.min_overlap == 0 {
            return Err(MatchError::InvalidConfig("min_overlap must be > 0".into()));
        }
        if self.max_image_dimension < self.block_size * 2 {
            return Err(MatchError::InvalidConfig(format!(
                "max_image_dimension must be >= {}, got {}",
                self.block_size * 2,
                self.max_image_dimension
            )));
        }
        Ok(())
    }

    /// Scale factor that brings an input image to [`TEMPLATE_DPI`].
    pub fn scale(&self) -> f64 {
        f64::from(TEMPLATE_DPI) / f64::from(self.dpi)
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            dpi: Self::default_dpi(),
            block_size: Self::default_block_size(),
            max_shift: Self::default_max_shift(),
            min_variance: Self::default_min_variance(),
            min_coherence: Self::default_min_coherence(),
            min_overlap: Self::default_min_overlap(),
            max_image_dimension: Self::default_max_image_dimension(),
        }
    }
}

/// Which side of a comparison an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Probe,
    Candidate,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Probe => f.write_str("probe"),
            Side::Candidate => f.write_str("candidate"),
        }
    }
}

/// Errors produced while turning image bytes into a score.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MatchError {
    #[error("{side} image is empty")]
    EmptyImage { side: Side },

    #[error("{side} image could not be decoded: {reason}")]
    Decode { side: Side, reason: String },

    #[error("{side} image is {width}x{height}, smaller than the {min}px minimum")]
    ImageTooSmall {
        side: Side,
        width: u32,
        height: u32,
        min: u32,
    },

    #[error("{side} image is larger than the {max}px limit")]
    ImageTooLarge { side: Side, max: u32 },

    #[error("{side} image has no ridge area")]
    NoRidgeArea { side: Side },

    #[error("invalid matcher config: {0}")]
    InvalidConfig(String),

    #[error("matcher backend failure: {0}")]
    Backend(String),
}

/// Result of one comparison before any fallback policy is applied.
///
/// The wire contract only carries a number, so a failed comparison and a
/// genuine non-match look the same to callers. Keeping the tag until the
/// boundary lets logs and tests tell them apart.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Scored(f64),
    Failed(MatchError),
}

impl MatchOutcome {
    /// Flatten the outcome to the number reported on the wire.
    ///
    /// `Failed` becomes [`FALLBACK_SCORE`]; the reason is logged so operators
    /// can still distinguish it from a real non-match.
    pub fn score_or_fallback(&self) -> f64 {
        match self {
            MatchOutcome::Scored(score) => *score,
            MatchOutcome::Failed(reason) => {
                tracing::warn!(
                    reason = %reason,
                    fallback = FALLBACK_SCORE,
                    "fingerprint comparison failed; reporting fallback score"
                );
                FALLBACK_SCORE
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, MatchOutcome::Failed(_))
    }

    pub fn failure(&self) -> Option<&MatchError> {
        match self {
            MatchOutcome::Scored(_) => None,
            MatchOutcome::Failed(err) => Some(err),
        }
    }
}

impl From<Result<f64, MatchError>> for MatchOutcome {
    fn from(result: Result<f64, MatchError>) -> Self {
        match result {
            Ok(score) => MatchOutcome::Scored(score),
            Err(err) => MatchOutcome::Failed(err),
        }
    }
}
