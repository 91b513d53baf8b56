use serde::{Deserialize, Serialize};

/// Minimum score at which two fingerprints are declared the same finger.
pub const MATCH_THRESHOLD: f64 = 40.0;

/// Score plus the decision derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    #[serde(rename = "match")]
    pub is_match: bool,
    pub score: f64,
}

impl Verdict {
    /// `is_match` holds exactly when `score >= threshold`.
    pub fn from_score(score: f64, threshold: f64) -> Self {
        Self {
            is_match: score >= threshold,
            score,
        }
    }
}
