// Spectral module - Frequency-domain feature extraction
//
// This module computes the fundamental frequency, the time-averaged
// magnitude spectrum, the mean spectral centroid and the band of
// significant spectral energy.
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - de Cheveigné, A. & Kawahara, H. (2002). YIN, a fundamental frequency
//   estimator for speech and music

use crate::analysis::pitch::YinTracker;
use crate::analysis::stft::StftProcessor;
use crate::analysis::types::Range;
use crate::error::AnalysisError;

/// Bins above this fraction of the profile peak count as significant
const SIGNIFICANT_ENERGY_RATIO: f64 = 0.1;

/// Fallback band when no bin carries significant energy (silence)
pub const DEFAULT_FREQUENCY_RANGE: Range = (0.0, 1000.0);

/// Everything the spectral analyzer derives from one pass over a signal
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralSummary {
    pub fundamental_hz: f64,
    pub profile: Vec<f64>,
    pub centroid_hz: f64,
    pub frequency_range: Range,
}

/// Spectral feature computation
pub struct SpectralAnalyzer {
    stft: StftProcessor,
    frame_length: usize,
    hop_length: usize,
    pitch_min_hz: f64,
    pitch_max_hz: f64,
    yin_threshold: f64,
}

impl SpectralAnalyzer {
    /// Create a new spectral analyzer
    ///
    /// # Arguments
    /// * `frame_length` - STFT and pitch frame size in samples
    /// * `hop_length` - Hop between frames in samples
    /// * `pitch_min_hz` / `pitch_max_hz` - Voiced pitch band
    /// * `yin_threshold` - Voicing threshold for the YIN tracker
    pub fn new(
        frame_length: usize,
        hop_length: usize,
        pitch_min_hz: f64,
        pitch_max_hz: f64,
        yin_threshold: f64,
    ) -> Self {
        Self {
            stft: StftProcessor::new(frame_length, hop_length),
            frame_length,
            hop_length,
            pitch_min_hz,
            pitch_max_hz,
            yin_threshold,
        }
    }

    /// Number of bins in a magnitude profile
    pub fn bin_count(&self) -> usize {
        self.stft.bin_count()
    }

    /// Estimate the fundamental frequency in Hz
    ///
    /// Averages the YIN estimate over voiced frames only. Silence or
    /// unvoiced input yields exactly 0.0.
    pub fn fundamental_frequency(&self, samples: &[f64], sample_rate: u32) -> f64 {
        YinTracker::new(
            sample_rate,
            self.frame_length,
            self.hop_length,
            self.pitch_min_hz,
            self.pitch_max_hz,
            self.yin_threshold,
        )
        .mean_voiced_frequency(samples)
    }

    /// Compute the time-averaged magnitude spectrum
    ///
    /// # Returns
    /// One value per frequency bin (`frame_length / 2 + 1` values)
    pub fn magnitude_spectrum(&self, samples: &[f64]) -> Result<Vec<f64>, AnalysisError> {
        let frames = self.stft.magnitude_frames(samples)?;
        Ok(Self::average_frames(&frames, self.bin_count()))
    }

    /// Compute the spectral centroid averaged across frames
    ///
    /// Formula per frame: centroid = Σ(f_i × |X[i]|) / Σ|X[i]|, with
    /// `f_i = i × sample_rate / frame_length`. Frames without energy
    /// contribute 0 Hz.
    pub fn spectral_centroid(&self, samples: &[f64], sample_rate: u32) -> Result<f64, AnalysisError> {
        let frames = self.stft.magnitude_frames(samples)?;
        Ok(self.mean_centroid(&frames, sample_rate))
    }

    /// Find the band of significant spectral energy
    ///
    /// Bins whose magnitude exceeds 10% of the profile peak qualify. The
    /// first and last qualifying bins are mapped to Hz as
    /// `index × sample_rate / profile.len()`. When nothing qualifies the
    /// documented default `(0.0, 1000.0)` is returned.
    pub fn significant_frequency_range(profile: &[f64], sample_rate: u32) -> Range {
        let peak = profile.iter().copied().fold(0.0_f64, f64::max);
        let threshold = peak * SIGNIFICANT_ENERGY_RATIO;

        let mut significant = profile
            .iter()
            .enumerate()
            .filter(|(_, &magnitude)| magnitude > threshold)
            .map(|(index, _)| index);

        let Some(first) = significant.next() else {
            return DEFAULT_FREQUENCY_RANGE;
        };
        let last = significant.last().unwrap_or(first);

        let bin_to_hz = |index: usize| index as f64 * sample_rate as f64 / profile.len() as f64;
        (bin_to_hz(first), bin_to_hz(last))
    }

    /// Average magnitude profile and mean centroid from one STFT pass
    pub fn profile_and_centroid(
        &self,
        samples: &[f64],
        sample_rate: u32,
    ) -> Result<(Vec<f64>, f64), AnalysisError> {
        let frames = self.stft.magnitude_frames(samples)?;
        let profile = Self::average_frames(&frames, self.bin_count());
        let centroid_hz = self.mean_centroid(&frames, sample_rate);

        tracing::debug!(frames = frames.len(), centroid_hz, "stft pass complete");

        Ok((profile, centroid_hz))
    }

    /// Run every spectral computation, pitch tracking included
    pub fn summarize(
        &self,
        samples: &[f64],
        sample_rate: u32,
    ) -> Result<SpectralSummary, AnalysisError> {
        let (profile, centroid_hz) = self.profile_and_centroid(samples, sample_rate)?;
        let frequency_range = Self::significant_frequency_range(&profile, sample_rate);
        let fundamental_hz = self.fundamental_frequency(samples, sample_rate);

        tracing::debug!(fundamental_hz, centroid_hz, "spectral summary computed");

        Ok(SpectralSummary {
            fundamental_hz,
            profile,
            centroid_hz,
            frequency_range,
        })
    }

    fn average_frames(frames: &[Vec<f64>], bins: usize) -> Vec<f64> {
        let mut profile = vec![0.0; bins];
        if frames.is_empty() {
            return profile;
        }

        for frame in frames {
            for (acc, &magnitude) in profile.iter_mut().zip(frame) {
                *acc += magnitude;
            }
        }

        let count = frames.len() as f64;
        profile.iter_mut().for_each(|value| *value /= count);
        profile
    }

    fn mean_centroid(&self, frames: &[Vec<f64>], sample_rate: u32) -> f64 {
        if frames.is_empty() {
            return 0.0;
        }

        let freq_bin_width = sample_rate as f64 / self.frame_length as f64;
        let total: f64 = frames
            .iter()
            .map(|frame| {
                let magnitude_sum: f64 = frame.iter().sum();
                if magnitude_sum <= f64::EPSILON {
                    return 0.0;
                }
                let weighted_sum: f64 = frame
                    .iter()
                    .enumerate()
                    .map(|(i, &mag)| i as f64 * freq_bin_width * mag)
                    .sum();
                weighted_sum / magnitude_sum
            })
            .sum();

        total / frames.len() as f64
    }
}
