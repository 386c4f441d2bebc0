// Display module - fixed-length presentation profiles
//
// Spectra and envelopes are peak-normalized into [0, 1] and stretched or
// squeezed to a fixed number of points for rendering. Nothing here feeds
// the similarity scorer.

use crate::analysis::types::SpectrumSnapshot;

/// Scale values so the largest magnitude becomes 1.0
///
/// All-zero (or empty) input is returned unchanged.
pub fn normalize_peak(values: &[f64]) -> Vec<f64> {
    let peak = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if peak <= 0.0 || !peak.is_finite() {
        return values.to_vec();
    }
    values.iter().map(|v| v / peak).collect()
}

/// Linearly resample a sequence to exactly `points` values
///
/// Endpoints are preserved. Empty input becomes `points` zeros and a single
/// value is repeated.
pub fn resample_to_length(values: &[f64], points: usize) -> Vec<f64> {
    match (values.len(), points) {
        (_, 0) => Vec::new(),
        (0, _) => vec![0.0; points],
        (1, _) => vec![values[0]; points],
        (_, 1) => vec![values[0]],
        (len, _) => {
            let scale = (len - 1) as f64 / (points - 1) as f64;
            (0..points)
                .map(|i| {
                    let position = i as f64 * scale;
                    let left = (position.floor() as usize).min(len - 1);
                    let right = (left + 1).min(len - 1);
                    let frac = position - left as f64;
                    values[left] + (values[right] - values[left]) * frac
                })
                .collect()
        }
    }
}

/// Build the presentation snapshot from a magnitude profile and envelope
pub fn snapshot(profile: &[f64], envelope: &[f64], points: usize) -> SpectrumSnapshot {
    SpectrumSnapshot {
        spectrum: resample_to_length(&normalize_peak(profile), points),
        envelope: resample_to_length(&normalize_peak(envelope), points),
    }
}
