// Decode module - audio files to mono PCM at a fixed analysis rate
//
// `AudioDecoder` is the seam between the trainer and whatever reads files
// from disk. `WavDecoder` covers PCM/float WAV through hound; other formats
// can be plugged in by implementing the trait.

use std::path::Path;

use crate::error::AnalysisError;

/// Mono PCM samples in [-1.0, 1.0] with their sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Decodes an audio file into mono samples at `target_rate`
pub trait AudioDecoder: Send + Sync {
    /// # Errors
    /// `DecodeUnavailable` when the file cannot be opened or decoded
    fn decode(&self, path: &Path, target_rate: u32) -> Result<DecodedAudio, AnalysisError>;
}

/// WAV decoder backed by hound
///
/// Multi-channel input is mixed down by averaging each frame; the result is
/// linearly resampled when the file rate differs from `target_rate`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavDecoder;

impl WavDecoder {
    pub fn new() -> Self {
        Self
    }

    fn read_interleaved(path: &Path) -> Result<(Vec<f32>, hound::WavSpec), AnalysisError> {
        let mut reader = hound::WavReader::open(path).map_err(|err| {
            AnalysisError::DecodeUnavailable {
                reason: format!("opening {}: {}", path.display(), err),
            }
        })?;
        let spec = reader.spec();

        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<Vec<f32>, hound::Error>>()?,
            hound::SampleFormat::Int => {
                let max = ((1i64 << (spec.bits_per_sample - 1)) - 1) as f32;
                match spec.bits_per_sample {
                    8 | 16 => reader
                        .samples::<i16>()
                        .map(|sample| sample.map(|value| value as f32 / max))
                        .collect::<Result<Vec<f32>, hound::Error>>()?,
                    24 | 32 => reader
                        .samples::<i32>()
                        .map(|sample| sample.map(|value| value as f32 / max))
                        .collect::<Result<Vec<f32>, hound::Error>>()?,
                    other => {
                        return Err(AnalysisError::DecodeUnavailable {
                            reason: format!(
                                "unsupported bits per sample {} in {}",
                                other,
                                path.display()
                            ),
                        })
                    }
                }
            }
        };

        Ok((samples, spec))
    }
}

impl AudioDecoder for WavDecoder {
    fn decode(&self, path: &Path, target_rate: u32) -> Result<DecodedAudio, AnalysisError> {
        if target_rate == 0 {
            return Err(AnalysisError::DecodeUnavailable {
                reason: "target sample rate must be greater than 0".to_string(),
            });
        }

        let (interleaved, spec) = Self::read_interleaved(path)?;
        if spec.channels == 0 || spec.sample_rate == 0 {
            return Err(AnalysisError::DecodeUnavailable {
                reason: format!("invalid WAV header in {}", path.display()),
            });
        }

        let mono = mix_to_mono(&interleaved, spec.channels as usize);
        let samples = resample_linear(&mono, spec.sample_rate, target_rate);

        log::debug!(
            "Decoded {} ({} ch @ {} Hz) -> {} samples @ {} Hz",
            path.display(),
            spec.channels,
            spec.sample_rate,
            samples.len(),
            target_rate
        );

        Ok(DecodedAudio {
            samples,
            sample_rate: target_rate,
        })
    }
}

/// Average interleaved frames down to one channel
pub fn mix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Linear-interpolation resampler
pub fn resample_linear(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if source_rate == target_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = source_rate as f64 / target_rate as f64;
    let out_len = ((samples.len() as f64 / ratio).round() as usize).max(1);
    let last = samples.len() - 1;

    (0..out_len)
        .map(|i| {
            let position = i as f64 * ratio;
            let index = (position.floor() as usize).min(last);
            let next = (index + 1).min(last);
            let frac = (position - index as f64).clamp(0.0, 1.0) as f32;
            samples[index] + (samples[next] - samples[index]) * frac
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, spec: hound::WavSpec, frames: &[Vec<i16>]) {
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for frame in frames {
            for &sample in frame {
                writer.write_sample(sample).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    fn int_spec(channels: u16, sample_rate: u32) -> hound::WavSpec {
        hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }

    #[test]
    fn test_decode_mono_same_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        let frames: Vec<Vec<i16>> = (0..1000).map(|i| vec![(i % 100) as i16 * 100]).collect();
        write_wav(&path, int_spec(1, 22_050), &frames);

        let decoded = WavDecoder::new().decode(&path, 22_050).unwrap();
        assert_eq!(decoded.sample_rate, 22_050);
        assert_eq!(decoded.samples.len(), 1000);
        assert!((decoded.samples[1] - 100.0 / i16::MAX as f32).abs() < 1e-6);
    }

    #[test]
    fn test_decode_stereo_mixes_down() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let frames: Vec<Vec<i16>> = (0..500).map(|_| vec![16_000, 0]).collect();
        write_wav(&path, int_spec(2, 22_050), &frames);

        let decoded = WavDecoder::new().decode(&path, 22_050).unwrap();
        assert_eq!(decoded.samples.len(), 500);
        let expected = 8_000.0 / i16::MAX as f32;
        assert!(decoded.samples.iter().all(|s| (s - expected).abs() < 1e-4));
    }

    #[test]
    fn test_decode_resamples_to_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("44k.wav");
        let frames: Vec<Vec<i16>> = (0..44_100).map(|_| vec![1000]).collect();
        write_wav(&path, int_spec(1, 44_100), &frames);

        let decoded = WavDecoder::new().decode(&path, 22_050).unwrap();
        assert_eq!(decoded.samples.len(), 22_050);
        assert!((decoded.duration_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_file_is_decode_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        match WavDecoder::new().decode(&dir.path().join("absent.wav"), 22_050) {
            Err(AnalysisError::DecodeUnavailable { reason }) => {
                assert!(reason.contains("absent.wav"))
            }
            other => panic!("Expected DecodeUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_file_is_decode_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.wav");
        std::fs::write(&path, b"definitely not a RIFF header").unwrap();
        assert!(matches!(
            WavDecoder::new().decode(&path, 22_050),
            Err(AnalysisError::DecodeUnavailable { .. })
        ));
    }

    #[test]
    fn test_resample_linear_interpolates() {
        let upsampled = resample_linear(&[0.0, 1.0], 1, 2);
        assert_eq!(upsampled.len(), 4);
        assert_eq!(upsampled[0], 0.0);
        assert_eq!(upsampled[1], 0.5);
        assert_eq!(upsampled[2], 1.0);
        assert_eq!(upsampled[3], 1.0);

        assert_eq!(resample_linear(&[0.25, 0.5], 8000, 8000), vec![0.25, 0.5]);
        assert!(resample_linear(&[], 44_100, 22_050).is_empty());
    }
}
