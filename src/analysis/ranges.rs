// Ranges module - acceptance bands around point estimates
//
// The range calculator widens a feature record's frequency and amplitude
// ranges symmetrically around their midpoints by a tolerance percentage,
// and derives the duration band from a clip length.

use crate::analysis::types::{midpoint, FeatureRecord, Range};
use crate::error::AnalysisError;

/// Shortest accepted lower duration bound in seconds
pub const MIN_DURATION_SECS: f64 = 0.1;

/// Duration band multipliers around the measured clip length
const DURATION_BAND: (f64, f64) = (0.8, 1.2);

/// Range calculation functions
pub struct RangeCalculator;

impl RangeCalculator {
    /// Reject tolerances outside [0, 100] (NaN included)
    pub fn validate_tolerance(tolerance_percent: f64) -> Result<f64, AnalysisError> {
        if (0.0..=100.0).contains(&tolerance_percent) {
            Ok(tolerance_percent)
        } else {
            Err(AnalysisError::InvalidTolerance {
                value: tolerance_percent,
            })
        }
    }

    /// Widen frequency and amplitude ranges by a tolerance percentage
    ///
    /// For each range: `mid = (min + max) / 2`, new range
    /// `(mid × (1 − t/100), mid × (1 + t/100))`. Duration range, centroid and
    /// RMS pass through unchanged. A tolerance of 0 collapses both ranges to
    /// their midpoint; 100 yields `(0, 2 × mid)`.
    ///
    /// # Errors
    /// `InvalidTolerance` when the tolerance lies outside [0, 100]
    pub fn apply_tolerance(
        features: &FeatureRecord,
        tolerance_percent: f64,
    ) -> Result<FeatureRecord, AnalysisError> {
        let factor = Self::validate_tolerance(tolerance_percent)? / 100.0;

        Ok(FeatureRecord {
            frequency_range: Self::widen(features.frequency_range, factor),
            amplitude_range: Self::widen(features.amplitude_range, factor),
            ..*features
        })
    }

    /// Duration band `(max(0.1, 0.8 d), 1.2 d)` for a clip of `d` seconds
    ///
    /// The upper bound is lifted to the lower one for clips shorter than
    /// ~83 ms so that `min <= max` always holds.
    pub fn duration_range(duration_secs: f64) -> Range {
        let min = (duration_secs * DURATION_BAND.0).max(MIN_DURATION_SECS);
        let max = (duration_secs * DURATION_BAND.1).max(min);
        (min, max)
    }

    fn widen(range: Range, factor: f64) -> Range {
        let mid = midpoint(range);
        (mid * (1.0 - factor), mid * (1.0 + factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> FeatureRecord {
        FeatureRecord {
            frequency_range: (100.0, 300.0),
            amplitude_range: (0.05, 0.15),
            duration_range: (0.4, 0.6),
            centroid: 1200.0,
            rms: 0.1,
        }
    }

    #[test]
    fn test_zero_tolerance_collapses_to_midpoint() {
        let widened = RangeCalculator::apply_tolerance(&record(), 0.0).unwrap();
        assert_eq!(widened.frequency_range, (200.0, 200.0));
        assert_eq!(widened.amplitude_range.0, widened.amplitude_range.1);
        assert!((widened.amplitude_range.0 - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_full_tolerance_spans_zero_to_double_midpoint() {
        let widened = RangeCalculator::apply_tolerance(&record(), 100.0).unwrap();
        assert_eq!(widened.frequency_range, (0.0, 400.0));
        assert_eq!(widened.amplitude_range.0, 0.0);
        assert!((widened.amplitude_range.1 - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_min_not_above_max_across_tolerances() {
        for step in 0..=100 {
            let widened = RangeCalculator::apply_tolerance(&record(), step as f64).unwrap();
            assert!(widened.frequency_range.0 <= widened.frequency_range.1);
            assert!(widened.amplitude_range.0 <= widened.amplitude_range.1);
        }
    }

    #[test]
    fn test_scalars_and_duration_pass_through() {
        let original = record();
        let widened = RangeCalculator::apply_tolerance(&original, 25.0).unwrap();
        assert_eq!(widened.duration_range, original.duration_range);
        assert_eq!(widened.centroid, original.centroid);
        assert_eq!(widened.rms, original.rms);
        assert_eq!(widened.frequency_range, (150.0, 250.0));
    }

    #[test]
    fn test_out_of_range_tolerance_rejected() {
        for bad in [-0.1, 100.5, f64::NAN, f64::INFINITY] {
            match RangeCalculator::apply_tolerance(&record(), bad) {
                Err(AnalysisError::InvalidTolerance { .. }) => {}
                other => panic!("Expected InvalidTolerance for {}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_duration_range_bounds() {
        let (min, max) = RangeCalculator::duration_range(1.0);
        assert!((min - 0.8).abs() < 1e-12);
        assert!((max - 1.2).abs() < 1e-12);

        // Short clips clamp the lower bound and keep min <= max
        let (min, max) = RangeCalculator::duration_range(0.05);
        assert_eq!(min, MIN_DURATION_SECS);
        assert!(min <= max);
    }
}
