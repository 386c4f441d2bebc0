// Amplitude module - Time-domain energy features
//
// This module computes the frame-wise RMS envelope on the same centered
// frame grid as the STFT, its mean, and the heuristic acceptance band
// around that mean.

use crate::analysis::stft::{centered_frames, pad_center};
use crate::analysis::types::Range;

/// Lower/upper multipliers of the heuristic amplitude band
const AMPLITUDE_BAND: (f64, f64) = (0.5, 1.5);

/// Amplitude feature computation
pub struct AmplitudeAnalyzer {
    frame_length: usize,
    hop_length: usize,
}

impl AmplitudeAnalyzer {
    /// Create a new amplitude analyzer
    ///
    /// # Arguments
    /// * `frame_length` - RMS window length in samples
    /// * `hop_length` - Hop between windows in samples
    pub fn new(frame_length: usize, hop_length: usize) -> Self {
        Self {
            frame_length,
            hop_length,
        }
    }

    /// Frame-wise root-mean-square energy over overlapping windows
    ///
    /// Formula per frame: rms = sqrt(Σ x[n]² / frame_length), computed on
    /// the zero-padded centered frame grid. Empty input or a degenerate
    /// geometry yields an empty envelope.
    pub fn rms_envelope(samples: &[f64], frame_length: usize, hop_length: usize) -> Vec<f64> {
        if samples.is_empty() || frame_length == 0 || hop_length == 0 {
            return Vec::new();
        }

        let padded = pad_center(samples, frame_length);
        centered_frames(&padded, frame_length, hop_length)
            .map(|frame| {
                let energy: f64 = frame.iter().map(|x| x * x).sum();
                (energy / frame_length as f64).sqrt()
            })
            .collect()
    }

    /// RMS envelope with this analyzer's frame geometry
    pub fn envelope(&self, samples: &[f64]) -> Vec<f64> {
        Self::rms_envelope(samples, self.frame_length, self.hop_length)
    }

    /// Scalar mean of the RMS envelope (0.0 for empty input)
    pub fn mean_rms(&self, samples: &[f64]) -> f64 {
        Self::mean(&self.envelope(samples))
    }

    /// Acceptable amplitude band: ±50% around the mean RMS
    pub fn amplitude_range(&self, samples: &[f64]) -> Range {
        Self::range_around(self.mean_rms(samples))
    }

    /// Heuristic band around an already computed mean RMS
    pub fn range_around(mean_rms: f64) -> Range {
        (mean_rms * AMPLITUDE_BAND.0, mean_rms * AMPLITUDE_BAND.1)
    }

    pub(crate) fn mean(envelope: &[f64]) -> f64 {
        if envelope.is_empty() {
            return 0.0;
        }
        envelope.iter().sum::<f64>() / envelope.len() as f64
    }
}
