//! Configuration management for analysis and scoring parameters
//!
//! This module provides runtime configuration loading from JSON files,
//! so frame sizes, pitch band, scoring targets and the storage location
//! can be adjusted without recompilation.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Feature extraction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Working sample rate the decoder resamples to
    pub sample_rate: u32,
    /// STFT / RMS / pitch frame length in samples
    pub frame_length: usize,
    /// Hop between consecutive frames in samples
    pub hop_length: usize,
    /// Lower bound of the voiced pitch band (C2)
    pub pitch_min_hz: f64,
    /// Upper bound of the voiced pitch band (C7)
    pub pitch_max_hz: f64,
    /// YIN cumulative-mean-normalized-difference threshold for voicing
    pub yin_threshold: f64,
    /// Length of presentation spectrum/envelope snapshots
    pub display_points: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22_050,
            frame_length: 2048,
            hop_length: 512,
            pitch_min_hz: 65.406,
            pitch_max_hz: 2093.005,
            yin_threshold: 0.15,
            display_points: 100,
        }
    }
}

/// Fixed ideal targets for the target-relative score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub target_fundamental_hz: f64,
    pub target_centroid_hz: f64,
    pub target_rms: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            target_fundamental_hz: 200.0,
            target_centroid_hz: 1000.0,
            target_rms: 0.5,
        }
    }
}

/// Reference store location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one `<id>.json` per reference profile
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/configurations"),
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration, or defaults if the file doesn't exist or
    /// the JSON is invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        Self::load_from_file("config/trainer.json")
    }
}
