// Analysis module - acoustic feature extraction and comparison
//
// This module turns mono PCM samples into frequency- and amplitude-domain
// descriptors and scores a candidate against a reference or fixed targets.
//
// Module organization:
// - types: Data structures (FeatureRecord, SpectrumSnapshot, AnalysisReport)
// - stft: Centered framing + windowed FFT
// - pitch: YIN fundamental frequency tracking
// - spectral: Fundamental, magnitude profile, centroid, significant band
// - amplitude: RMS envelope, mean RMS, amplitude band
// - ranges: Tolerance widening and duration band
// - similarity: Reference-relative and target-relative scores
// - display: Fixed-length normalized snapshots for rendering
// - mod.rs: Coordinator (FeatureExtractor)
//
// The spectral and amplitude passes are independent; both are synchronous,
// CPU-bound and free of side effects, so callers run them on a blocking
// worker (see `TrainerContext`).

pub mod amplitude;
pub mod display;
pub mod pitch;
pub mod ranges;
pub mod similarity;
pub mod spectral;
pub mod stft;
pub mod types;

pub use amplitude::AmplitudeAnalyzer;
pub use ranges::RangeCalculator;
pub use similarity::{score_against_reference, ScoringMode, TargetScorer};
pub use spectral::SpectralAnalyzer;
pub use types::{AnalysisReport, FeatureRecord, Range, SpectrumSnapshot};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;

/// FeatureExtractor coordinates the spectral and amplitude analyzers
///
/// One extractor is built per process from `AnalysisConfig` and shared
/// behind an `Arc`; it holds no mutable state.
pub struct FeatureExtractor {
    spectral: SpectralAnalyzer,
    amplitude: AmplitudeAnalyzer,
    display_points: usize,
}

impl FeatureExtractor {
    /// Create a new FeatureExtractor from analysis configuration
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            spectral: SpectralAnalyzer::new(
                config.frame_length,
                config.hop_length,
                config.pitch_min_hz,
                config.pitch_max_hz,
                config.yin_threshold,
            ),
            amplitude: AmplitudeAnalyzer::new(config.frame_length, config.hop_length),
            display_points: config.display_points,
        }
    }

    pub fn spectral(&self) -> &SpectralAnalyzer {
        &self.spectral
    }

    pub fn amplitude(&self) -> &AmplitudeAnalyzer {
        &self.amplitude
    }

    /// Extract the feature record used to configure a reference
    ///
    /// Composes the significant frequency band of the averaged spectrum,
    /// the ±50% amplitude band, the duration band, the mean centroid and
    /// the mean RMS. Pitch tracking is skipped since the record does not
    /// carry a fundamental.
    ///
    /// # Errors
    /// `ExtractionFailed` for empty input, a zero sample rate or
    /// non-finite samples
    pub fn extract_features(
        &self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<FeatureRecord, AnalysisError> {
        let signal = prepare_signal(samples, sample_rate)?;
        let (profile, centroid) = self.spectral.profile_and_centroid(&signal, sample_rate)?;
        let envelope = self.amplitude.envelope(&signal);

        Ok(self.build_record(&signal, sample_rate, &profile, centroid, &envelope))
    }

    /// Run the full analysis used for candidate clips
    ///
    /// Adds the fundamental frequency and the presentation snapshot to the
    /// feature record.
    pub fn analyze(&self, samples: &[f32], sample_rate: u32) -> Result<AnalysisReport, AnalysisError> {
        let signal = prepare_signal(samples, sample_rate)?;
        let summary = self.spectral.summarize(&signal, sample_rate)?;
        let envelope = self.amplitude.envelope(&signal);

        let features = self.build_record(
            &signal,
            sample_rate,
            &summary.profile,
            summary.centroid_hz,
            &envelope,
        );
        let snapshot = display::snapshot(&summary.profile, &envelope, self.display_points);

        tracing::info!(
            samples = signal.len(),
            sample_rate,
            fundamental_hz = summary.fundamental_hz,
            centroid_hz = features.centroid,
            rms = features.rms,
            "analysis complete"
        );

        Ok(AnalysisReport {
            fundamental_hz: summary.fundamental_hz,
            centroid_hz: features.centroid,
            rms: features.rms,
            duration_secs: duration_secs(signal.len(), sample_rate),
            features,
            snapshot,
        })
    }

    fn build_record(
        &self,
        signal: &[f64],
        sample_rate: u32,
        profile: &[f64],
        centroid: f64,
        envelope: &[f64],
    ) -> FeatureRecord {
        let rms = AmplitudeAnalyzer::mean(envelope);

        FeatureRecord {
            frequency_range: SpectralAnalyzer::significant_frequency_range(profile, sample_rate),
            amplitude_range: AmplitudeAnalyzer::range_around(rms),
            duration_range: RangeCalculator::duration_range(duration_secs(
                signal.len(),
                sample_rate,
            )),
            centroid,
            rms,
        }
    }
}

fn duration_secs(len: usize, sample_rate: u32) -> f64 {
    len as f64 / sample_rate as f64
}

/// Validate decoder output and widen it to f64
fn prepare_signal(samples: &[f32], sample_rate: u32) -> Result<Vec<f64>, AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::ExtractionFailed {
            reason: "no samples supplied".to_string(),
        });
    }
    if sample_rate == 0 {
        return Err(AnalysisError::ExtractionFailed {
            reason: "sample rate must be greater than 0".to_string(),
        });
    }
    if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
        return Err(AnalysisError::ExtractionFailed {
            reason: format!("non-finite sample at index {}", index),
        });
    }

    Ok(samples.iter().map(|&s| s as f64).collect())
}
