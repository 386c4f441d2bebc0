// Analysis error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Analysis error code constants
///
/// These constants provide a single source of truth for error codes
/// shared with whatever transport layer sits above the engine.
///
/// Error code range: 1001-1005
pub struct AnalysisErrorCodes {}

impl AnalysisErrorCodes {
    /// Decode collaborator could not supply usable samples
    pub const DECODE_UNAVAILABLE: i32 = 1001;

    /// Numeric failure inside spectral or amplitude computation
    pub const EXTRACTION_FAILED: i32 = 1002;

    /// Tolerance outside [0, 100]
    pub const INVALID_TOLERANCE: i32 = 1003;

    /// Reference has no extracted features yet
    pub const MISSING_FEATURES: i32 = 1004;

    /// Background extraction task did not complete
    pub const WORKER_FAILED: i32 = 1005;
}

/// Log an analysis error with structured context
///
/// This function logs analysis errors with structured fields including:
/// - error_code: Numeric error code for programmatic handling
/// - component: The component where the error occurred
/// - message: Human-readable error message
/// - context: Additional contextual information
pub fn log_analysis_error(err: &AnalysisError, context: &str) {
    error!(
        "Analysis error in {}: code={}, component=FeatureExtractor, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Analysis-related errors
///
/// These errors cover decoding handoff, feature extraction, tolerance
/// validation and the extraction precondition on reference profiles.
///
/// Error code ranges: 1001-1005
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Upstream decoder failed to supply usable samples
    DecodeUnavailable { reason: String },

    /// Transform or amplitude computation failed on degenerate input
    ExtractionFailed { reason: String },

    /// Tolerance percent outside [0, 100] (or not a number)
    InvalidTolerance { value: f64 },

    /// Operation needs the reference's features before extraction has run
    MissingFeatures { id: String },

    /// Blocking extraction task panicked or was cancelled
    WorkerFailed { reason: String },
}

impl ErrorCode for AnalysisError {
    fn code(&self) -> i32 {
        match self {
            AnalysisError::DecodeUnavailable { .. } => AnalysisErrorCodes::DECODE_UNAVAILABLE,
            AnalysisError::ExtractionFailed { .. } => AnalysisErrorCodes::EXTRACTION_FAILED,
            AnalysisError::InvalidTolerance { .. } => AnalysisErrorCodes::INVALID_TOLERANCE,
            AnalysisError::MissingFeatures { .. } => AnalysisErrorCodes::MISSING_FEATURES,
            AnalysisError::WorkerFailed { .. } => AnalysisErrorCodes::WORKER_FAILED,
        }
    }

    fn message(&self) -> String {
        match self {
            AnalysisError::DecodeUnavailable { reason } => {
                format!("Audio decode unavailable: {}", reason)
            }
            AnalysisError::ExtractionFailed { reason } => {
                format!("Feature extraction failed: {}", reason)
            }
            AnalysisError::InvalidTolerance { value } => {
                format!("Tolerance must be within [0, 100] (got {})", value)
            }
            AnalysisError::MissingFeatures { id } => {
                format!("Reference {} has no extracted features", id)
            }
            AnalysisError::WorkerFailed { reason } => {
                format!("Extraction worker failed: {}", reason)
            }
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AnalysisError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for AnalysisError {}

impl From<hound::Error> for AnalysisError {
    fn from(err: hound::Error) -> Self {
        AnalysisError::DecodeUnavailable {
            reason: err.to_string(),
        }
    }
}
