// STFT module - Short-time Fourier transform framing
//
// This module slices a signal into centered, overlapping frames, applies a
// Hann window to reduce spectral leakage, and returns one magnitude
// spectrum per frame. The spectral analyzer averages or reduces these.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::error::AnalysisError;

/// Pad a signal with `frame_length / 2` zeros on both sides
///
/// Centered framing makes frame `t` describe the signal around sample
/// `t * hop_length`, matching the RMS envelope frame grid.
pub fn pad_center(samples: &[f64], frame_length: usize) -> Vec<f64> {
    let pad = frame_length / 2;
    let mut padded = Vec::with_capacity(samples.len() + 2 * pad);
    padded.resize(pad, 0.0);
    padded.extend_from_slice(samples);
    padded.resize(samples.len() + 2 * pad, 0.0);
    padded
}

/// Iterate over centered frames of `frame_length` samples every `hop_length`
///
/// Yields `1 + samples.len() / hop_length` frames for any non-empty input.
pub fn centered_frames(
    padded: &[f64],
    frame_length: usize,
    hop_length: usize,
) -> impl Iterator<Item = &[f64]> {
    padded.windows(frame_length).step_by(hop_length)
}

/// STFT processor that computes magnitude frames from a whole signal
pub struct StftProcessor {
    fft: Arc<dyn Fft<f64>>,
    frame_length: usize,
    hop_length: usize,
    /// Periodic Hann window (pre-computed)
    window: Vec<f64>,
}

impl StftProcessor {
    /// Create a new STFT processor
    ///
    /// # Arguments
    /// * `frame_length` - FFT size in samples (2048 by default)
    /// * `hop_length` - Distance between frame starts in samples
    pub fn new(frame_length: usize, hop_length: usize) -> Self {
        let window = (0..frame_length)
            .map(|i| {
                0.5 * (1.0 - ((2.0 * std::f64::consts::PI * i as f64) / frame_length as f64).cos())
            })
            .collect();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(frame_length.max(1));

        Self {
            fft,
            frame_length,
            hop_length,
            window,
        }
    }

    pub fn frame_length(&self) -> usize {
        self.frame_length
    }

    /// Number of frequency bins per frame (`frame_length / 2 + 1`)
    pub fn bin_count(&self) -> usize {
        self.frame_length / 2 + 1
    }

    /// Compute the magnitude spectrum of every centered frame
    ///
    /// # Returns
    /// One `bin_count()`-long magnitude vector per frame
    ///
    /// # Errors
    /// `ExtractionFailed` for empty input, zero-sized frames or hops, or
    /// non-finite magnitudes
    pub fn magnitude_frames(&self, samples: &[f64]) -> Result<Vec<Vec<f64>>, AnalysisError> {
        if samples.is_empty() {
            return Err(AnalysisError::ExtractionFailed {
                reason: "cannot transform an empty signal".to_string(),
            });
        }
        if self.frame_length < 2 || self.hop_length == 0 {
            return Err(AnalysisError::ExtractionFailed {
                reason: format!(
                    "invalid STFT geometry: frame_length={}, hop_length={}",
                    self.frame_length, self.hop_length
                ),
            });
        }

        let padded = pad_center(samples, self.frame_length);
        let bins = self.bin_count();
        let mut buffer: Vec<Complex<f64>> = vec![Complex::new(0.0, 0.0); self.frame_length];
        let mut frames = Vec::new();

        for frame in centered_frames(&padded, self.frame_length, self.hop_length) {
            for ((slot, &sample), &w) in buffer.iter_mut().zip(frame).zip(&self.window) {
                *slot = Complex::new(sample * w, 0.0);
            }

            self.fft.process(&mut buffer);

            let magnitudes: Vec<f64> = buffer[..bins].iter().map(|c| c.norm()).collect();
            if magnitudes.iter().any(|m| !m.is_finite()) {
                return Err(AnalysisError::ExtractionFailed {
                    reason: "non-finite magnitude in STFT frame".to_string(),
                });
            }
            frames.push(magnitudes);
        }

        Ok(frames)
    }
}
