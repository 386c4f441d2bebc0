// Types module - Data structures for acoustic features
//
// This module defines the records passed between the analyzers, the range
// calculator, the similarity scorer and the reference store. Field names of
// `FeatureRecord` are persisted verbatim (camelCase) inside reference files.

use serde::{Deserialize, Serialize};

/// Closed numeric interval `(min, max)` with `min <= max`
pub type Range = (f64, f64);

/// Midpoint of a range
pub fn midpoint(range: Range) -> f64 {
    (range.0 + range.1) / 2.0
}

/// Features extracted from one audio clip
///
/// Created from raw samples by the spectral and amplitude analyzers, widened
/// at most by the range calculator, then treated as immutable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRecord {
    /// Hz bounds of significant spectral energy
    pub frequency_range: Range,

    /// RMS bounds (acceptable loudness band)
    pub amplitude_range: Range,

    /// Seconds bounds; the lower bound never drops below 0.1 s
    pub duration_range: Range,

    /// Mean spectral centroid in Hz
    pub centroid: f64,

    /// Mean RMS energy
    pub rms: f64,
}

/// Fixed-length normalized profiles for response rendering
///
/// Never fed back into scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumSnapshot {
    /// Peak-normalized average magnitude spectrum, resampled
    pub spectrum: Vec<f64>,
    /// Peak-normalized RMS envelope, resampled
    pub envelope: Vec<f64>,
}

/// Full result of analysing one clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Mean pitch over voiced frames, 0.0 when nothing is voiced
    pub fundamental_hz: f64,
    pub centroid_hz: f64,
    pub rms: f64,
    pub duration_secs: f64,
    pub features: FeatureRecord,
    pub snapshot: SpectrumSnapshot,
}
