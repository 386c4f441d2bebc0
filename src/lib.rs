// Phoneme Trainer Core - acoustic reference profiles and pronunciation scoring
// Feature extraction, tolerance ranges, similarity scoring and durable storage

// Module declarations
pub mod analysis;
pub mod audio;
pub mod config;
pub mod context;
pub mod error;
pub mod reference;

// Re-exports for convenience
pub use analysis::{AnalysisReport, FeatureExtractor, FeatureRecord, ScoringMode};
pub use config::AppConfig;
pub use context::{AnalysisOutcome, TrainerContext};
pub use error::{AnalysisError, ErrorCode, StoreError, TrainerError};
pub use reference::{ReferenceProfile, ReferenceStore};
