use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use crate::template::{FingerprintImage, FingerprintTemplate};
use crate::types::{MatchError, MatchOutcome, MatcherConfig, Side};

#[cfg(test)]
mod tests;

/// A fingerprint comparison backend.
///
/// Implementations take two raw image buffers and return a similarity score.
/// Higher means more similar; the scale is owned by the backend and the
/// decision threshold is applied by the caller.
pub trait FingerprintMatcher: Send + Sync {
    fn score(&self, probe: &[u8], candidate: &[u8]) -> Result<f64, MatchError>;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Adapter between request handling and a [`FingerprintMatcher`] backend.
///
/// Every call decodes and templates both images from scratch; nothing is
/// cached between calls.
#[derive(Clone)]
pub struct Matcher {
    backend: Arc<dyn FingerprintMatcher>,
}

impl Matcher {
    /// Wrap an arbitrary backend.
    pub fn new(backend: Arc<dyn FingerprintMatcher>) -> Self {
        Self { backend }
    }

    /// Build a matcher over [`TemplateMatcher`] with the given config.
    pub fn with_config(cfg: MatcherConfig) -> Result<Self, MatchError> {
        Ok(Self::new(Arc::new(TemplateMatcher::new(cfg)?)))
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Compare `candidate` against `probe`, keeping failures tagged.
    ///
    /// A panicking backend is reported as [`MatchError::Backend`].
    pub fn evaluate(&self, probe: &[u8], candidate: &[u8]) -> MatchOutcome {
        let start = Instant::now();
        let result = catch_unwind(AssertUnwindSafe(|| self.backend.score(probe, candidate)))
            .unwrap_or_else(|payload| Err(MatchError::Backend(panic_message(&*payload))));
        let outcome = MatchOutcome::from(result);

        tracing::debug!(
            backend = self.backend.name(),
            probe_bytes = probe.len(),
            candidate_bytes = candidate.len(),
            failed = outcome.is_failed(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "fingerprint comparison finished"
        );
        outcome
    }

    /// Compare and flatten failures to [`crate::FALLBACK_SCORE`].
    pub fn verify(&self, probe: &[u8], candidate: &[u8]) -> f64 {
        self.evaluate(probe, candidate).score_or_fallback()
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(Arc::new(TemplateMatcher::default()))
    }
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("backend", &self.backend.name())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("backend panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("backend panicked: {msg}")
    } else {
        "backend panicked".to_string()
    }
}

/// Ridge-field matcher built on the `image` crate.
///
/// Scores are in `[0, 100]`: the coherence-weighted block similarity of the
/// best alignment, scaled by how much of the smaller ridge area that
/// alignment covers. Block similarity requires both the ridge orientation
/// and the ridge spacing to agree. An image compared with itself scores 100.
#[derive(Debug, Clone, Default)]
pub struct TemplateMatcher {
    cfg: MatcherConfig,
}

impl TemplateMatcher {
    pub fn new(cfg: MatcherConfig) -> Result<Self, MatchError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.cfg
    }

    /// Decode `bytes` and extract its template.
    pub fn template(&self, bytes: &[u8], side: Side) -> Result<FingerprintTemplate, MatchError> {
        let image = FingerprintImage::decode(bytes, side, &self.cfg)?;
        FingerprintTemplate::new(&image, side, &self.cfg)
    }

    /// Prepare `probe` for comparisons.
    pub fn index<'a>(&'a self, probe: &'a FingerprintTemplate) -> ProbeIndex<'a> {
        ProbeIndex {
            probe,
            cfg: &self.cfg,
        }
    }
}

impl FingerprintMatcher for TemplateMatcher {
    fn score(&self, probe: &[u8], candidate: &[u8]) -> Result<f64, MatchError> {
        let probe = self.template(probe, Side::Probe)?;
        let candidate = self.template(candidate, Side::Candidate)?;
        Ok(self.index(&probe).match_template(&candidate))
    }

    fn name(&self) -> &'static str {
        "ridge-field"
    }
}

/// A probe template ready to be compared against candidates.
#[derive(Debug, Clone, Copy)]
pub struct ProbeIndex<'a> {
    probe: &'a FingerprintTemplate,
    cfg: &'a MatcherConfig,
}

impl ProbeIndex<'_> {
    /// Similarity of `candidate` to the indexed probe, in `[0, 100]`.
    ///
    /// The candidate is translated over the probe by up to `max_shift`
    /// blocks in each direction and the best alignment wins. Alignments with
    /// fewer than `min_overlap` shared ridge blocks are ignored.
    pub fn match_template(&self, candidate: &FingerprintTemplate) -> f64 {
        let probe = self.probe;
        let max_shift = i64::from(self.cfg.max_shift);
        let smaller_area = probe.ridge_blocks().min(candidate.ridge_blocks());
        if smaller_area == 0 {
            return 0.0;
        }

        let mut best = 0.0f64;
        for dy in -max_shift..=max_shift {
            for dx in -max_shift..=max_shift {
                let mut overlap = 0usize;
                let mut weight = 0.0f64;
                let mut agreement = 0.0f64;

                for row in 0..probe.rows() as i64 {
                    for col in 0..probe.cols() as i64 {
                        let Some(p) = probe.block(col, row) else {
                            continue;
                        };
                        let Some(c) = candidate.block(col + dx, row + dy) else {
                            continue;
                        };
                        let w = f64::from(p.coherence.min(c.coherence));
                        overlap += 1;
                        weight += w;
                        agreement += w * f64::from(p.similarity(c));
                    }
                }

                if overlap < self.cfg.min_overlap || weight <= f64::EPSILON {
                    continue;
                }
                let coverage = overlap as f64 / smaller_area as f64;
                best = best.max(agreement / weight * coverage);
            }
        }

        (best * 100.0).clamp(0.0, 100.0)
    }
}
