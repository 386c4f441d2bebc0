// Pitch module - frame-wise fundamental frequency tracking
//
// Implements the YIN estimator (de Cheveigné & Kawahara, 2002) over
// overlapping frames. Each frame is flagged voiced when the cumulative mean
// normalized difference dips below the threshold inside the lag range of
// the configured pitch band and the refined estimate stays inside the band.

/// Frames whose energy is below this are treated as silence (unvoiced)
const SILENCE_ENERGY: f64 = 1e-10;

/// Pitch estimate for one analysis frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchFrame {
    /// Estimated fundamental in Hz (0.0 when unvoiced)
    pub frequency_hz: f64,
    pub voiced: bool,
}

impl PitchFrame {
    const UNVOICED: PitchFrame = PitchFrame {
        frequency_hz: 0.0,
        voiced: false,
    };
}

/// YIN pitch tracker restricted to a frequency band
pub struct YinTracker {
    sample_rate: f64,
    frame_length: usize,
    hop_length: usize,
    min_freq: f64,
    max_freq: f64,
    min_lag: usize,
    max_lag: usize,
    threshold: f64,
}

impl YinTracker {
    /// Create a tracker for the given sample rate, frame geometry and band
    ///
    /// The frame is lengthened when needed so it holds two periods of the
    /// lowest band frequency; otherwise high sample rates would push the
    /// detectable floor above `min_freq`.
    pub fn new(
        sample_rate: u32,
        frame_length: usize,
        hop_length: usize,
        min_freq: f64,
        max_freq: f64,
        threshold: f64,
    ) -> Self {
        let sample_rate = sample_rate as f64;
        let min_lag = ((sample_rate / max_freq).floor() as usize).max(2);
        let longest_period = (sample_rate / min_freq).ceil() as usize;
        let frame_length = frame_length.max(2 * longest_period + 2);
        let max_lag = longest_period.min(frame_length / 2);

        Self {
            sample_rate,
            frame_length,
            hop_length: hop_length.max(1),
            min_freq,
            max_freq,
            min_lag,
            max_lag,
            threshold,
        }
    }

    /// Frame length actually used, after lengthening for the band
    pub fn frame_length(&self) -> usize {
        self.frame_length
    }

    /// Track pitch over the whole signal
    ///
    /// Signals shorter than one frame are zero-padded to a single frame.
    pub fn track(&self, samples: &[f64]) -> Vec<PitchFrame> {
        if samples.is_empty() || self.min_lag >= self.max_lag {
            return Vec::new();
        }

        if samples.len() < self.frame_length {
            let mut padded = samples.to_vec();
            padded.resize(self.frame_length, 0.0);
            return vec![self.detect(&padded)];
        }

        samples
            .windows(self.frame_length)
            .step_by(self.hop_length)
            .map(|frame| self.detect(frame))
            .collect()
    }

    /// Mean of the estimates over voiced frames, or 0.0 if none is voiced
    pub fn mean_voiced_frequency(&self, samples: &[f64]) -> f64 {
        let (sum, count) = self
            .track(samples)
            .iter()
            .filter(|frame| frame.voiced)
            .fold((0.0, 0usize), |(sum, count), frame| {
                (sum + frame.frequency_hz, count + 1)
            });

        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    /// Detect pitch in a single frame
    fn detect(&self, frame: &[f64]) -> PitchFrame {
        let energy: f64 = frame.iter().map(|x| x * x).sum();
        if energy < SILENCE_ENERGY {
            return PitchFrame::UNVOICED;
        }

        let cmnd = self.cumulative_mean_normalized_difference(frame);

        let mut tau = self.min_lag;
        let mut found = None;
        while tau <= self.max_lag {
            if cmnd[tau] < self.threshold {
                // Walk down to the bottom of this dip
                while tau < self.max_lag && cmnd[tau + 1] < cmnd[tau] {
                    tau += 1;
                }
                found = Some(tau);
                break;
            }
            tau += 1;
        }

        let Some(tau) = found else {
            return PitchFrame::UNVOICED;
        };

        let refined = parabolic_interpolation(&cmnd, tau);
        if refined <= 0.0 {
            return PitchFrame::UNVOICED;
        }

        let frequency_hz = self.sample_rate / refined;
        if frequency_hz < self.min_freq || frequency_hz > self.max_freq {
            return PitchFrame::UNVOICED;
        }

        PitchFrame {
            frequency_hz,
            voiced: true,
        }
    }

    /// Difference function followed by cumulative mean normalization
    ///
    /// Returns `max_lag + 2` values so the dip at `max_lag` can still be
    /// interpolated.
    fn cumulative_mean_normalized_difference(&self, frame: &[f64]) -> Vec<f64> {
        let lags = self.max_lag + 2;
        let window = frame.len().saturating_sub(lags);

        let mut cmnd = vec![1.0; lags];
        let mut running_sum = 0.0;

        for tau in 1..lags {
            let d: f64 = (0..window)
                .map(|j| {
                    let diff = frame[j] - frame[j + tau];
                    diff * diff
                })
                .sum();

            running_sum += d;
            cmnd[tau] = if running_sum > 0.0 {
                d * tau as f64 / running_sum
            } else {
                1.0
            };
        }

        cmnd
    }
}

/// Parabolic interpolation for sub-sample lag accuracy
fn parabolic_interpolation(data: &[f64], tau: usize) -> f64 {
    if tau == 0 || tau + 1 >= data.len() {
        return tau as f64;
    }

    let s0 = data[tau - 1];
    let s1 = data[tau];
    let s2 = data[tau + 1];
    let denominator = 2.0 * (2.0 * s1 - s0 - s2);

    let adjustment = (s2 - s0) / denominator;
    if adjustment.is_finite() && adjustment.abs() < 1.0 {
        tau as f64 + adjustment
    } else {
        tau as f64
    }
}
