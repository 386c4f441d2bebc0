// Similarity module - 0-100 scores for a candidate clip
//
// Two scorers coexist:
// - Reference-relative: compares a candidate FeatureRecord with the record
//   stored on a reference profile. This is the authoritative score whenever
//   the caller selects a reference.
// - Target-relative: compares raw measurements with fixed ideal targets
//   from configuration. Used only when no reference is selected.
//
// Both are pure functions of their inputs.

use serde::{Deserialize, Serialize};

use crate::analysis::types::{midpoint, AnalysisReport, FeatureRecord};
use crate::config::ScoringConfig;

// Weights are expressed in percent so identical inputs sum to exactly 100.
const REFERENCE_FREQUENCY_WEIGHT: f64 = 40.0;
const REFERENCE_AMPLITUDE_WEIGHT: f64 = 30.0;
const REFERENCE_CENTROID_WEIGHT: f64 = 30.0;

const TARGET_FUNDAMENTAL_WEIGHT: f64 = 0.4;
const TARGET_CENTROID_WEIGHT: f64 = 0.4;
const TARGET_RMS_WEIGHT: f64 = 0.2;

/// Which scorer produced a similarity value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScoringMode {
    ReferenceRelative { reference_id: String },
    TargetRelative,
}

/// Relative closeness of two non-negative values in [0, 1]
///
/// `max(0, 1 − |a − b| / max(a, b))`; a zero (or negative) denominator
/// yields 0.0 instead of dividing.
pub fn relative_similarity(a: f64, b: f64) -> f64 {
    let denominator = a.max(b);
    if denominator <= 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    (1.0 - (a - b).abs() / denominator).max(0.0)
}

/// Score a candidate against a reference profile's features
///
/// Combines frequency-midpoint, RMS and centroid closeness weighted
/// 0.4 / 0.3 / 0.3, scaled to [0, 100]. A reference without features
/// scores 0.0. Identical records with non-zero features score exactly 100.
pub fn score_against_reference(
    candidate: &FeatureRecord,
    reference: Option<&FeatureRecord>,
) -> f64 {
    let Some(reference) = reference else {
        return 0.0;
    };

    let frequency = relative_similarity(
        midpoint(candidate.frequency_range),
        midpoint(reference.frequency_range),
    );
    let amplitude = relative_similarity(candidate.rms, reference.rms);
    let centroid = relative_similarity(candidate.centroid, reference.centroid);

    let score = frequency * REFERENCE_FREQUENCY_WEIGHT
        + amplitude * REFERENCE_AMPLITUDE_WEIGHT
        + centroid * REFERENCE_CENTROID_WEIGHT;

    score.clamp(0.0, 100.0)
}

/// Scorer against fixed ideal targets
#[derive(Debug, Clone)]
pub struct TargetScorer {
    targets: ScoringConfig,
}

impl TargetScorer {
    pub fn new(targets: ScoringConfig) -> Self {
        Self { targets }
    }

    /// Score raw measurements against the configured targets
    ///
    /// Each feature scores `max(0, 100 − penalty)` where the penalty is the
    /// absolute difference divided by 10 (fundamental), divided by 100
    /// (centroid) or multiplied by 200 (RMS). Weighted 0.4 / 0.4 / 0.2 and
    /// clamped to [0, 100].
    pub fn score(&self, fundamental_hz: f64, centroid_hz: f64, rms: f64) -> f64 {
        let fundamental_diff = (fundamental_hz - self.targets.target_fundamental_hz).abs();
        let centroid_diff = (centroid_hz - self.targets.target_centroid_hz).abs();
        let rms_diff = (rms - self.targets.target_rms).abs();

        let fundamental_score = (100.0 - fundamental_diff / 10.0).max(0.0);
        let centroid_score = (100.0 - centroid_diff / 100.0).max(0.0);
        let rms_score = (100.0 - rms_diff * 200.0).max(0.0);

        let total = fundamental_score * TARGET_FUNDAMENTAL_WEIGHT
            + centroid_score * TARGET_CENTROID_WEIGHT
            + rms_score * TARGET_RMS_WEIGHT;

        if total.is_nan() {
            return 0.0;
        }
        total.clamp(0.0, 100.0)
    }

    /// Score an analysis report against the targets
    pub fn score_report(&self, report: &AnalysisReport) -> f64 {
        self.score(report.fundamental_hz, report.centroid_hz, report.rms)
    }
}

impl Default for TargetScorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}
