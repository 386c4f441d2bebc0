// Error types for the phoneme trainer
//
// This module defines the closed set of error kinds raised by the analysis
// pipeline and the reference store. Every kind carries a numeric code so the
// outer transport layer can map failures without string matching.

mod analysis;
mod store;

pub use analysis::{log_analysis_error, AnalysisError, AnalysisErrorCodes};
pub use store::{log_store_error, StoreError, StoreErrorCodes};

use std::fmt;

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling at the
/// transport boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

/// Top-level error returned by `TrainerContext` operations
///
/// Request-level operations touch both the analysis pipeline and the store,
/// so they report either kind through this wrapper.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainerError {
    Analysis(AnalysisError),
    Store(StoreError),
}

impl ErrorCode for TrainerError {
    fn code(&self) -> i32 {
        match self {
            TrainerError::Analysis(err) => err.code(),
            TrainerError::Store(err) => err.code(),
        }
    }

    fn message(&self) -> String {
        match self {
            TrainerError::Analysis(err) => err.message(),
            TrainerError::Store(err) => err.message(),
        }
    }
}

impl fmt::Display for TrainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainerError::Analysis(err) => fmt::Display::fmt(err, f),
            TrainerError::Store(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for TrainerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrainerError::Analysis(err) => Some(err),
            TrainerError::Store(err) => Some(err),
        }
    }
}

impl From<AnalysisError> for TrainerError {
    fn from(err: AnalysisError) -> Self {
        TrainerError::Analysis(err)
    }
}

impl From<StoreError> for TrainerError {
    fn from(err: StoreError) -> Self {
        TrainerError::Store(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trainer_error_delegates_code() {
        let err: TrainerError = AnalysisError::InvalidTolerance { value: 150.0 }.into();
        assert_eq!(err.code(), AnalysisErrorCodes::INVALID_TOLERANCE);

        let err: TrainerError = StoreError::ReferenceNotFound {
            id: "abc".to_string(),
        }
        .into();
        assert_eq!(err.code(), StoreErrorCodes::REFERENCE_NOT_FOUND);
        assert!(err.message().contains("abc"));
    }

    #[test]
    fn test_error_code_trait() {
        let analysis_err: &dyn ErrorCode = &AnalysisError::ExtractionFailed {
            reason: "empty".to_string(),
        };
        assert_eq!(analysis_err.code(), 1002);

        let store_err: &dyn ErrorCode = &StoreError::LockPoisoned;
        assert_eq!(store_err.code(), 2005);
    }

    #[test]
    fn test_error_propagation() {
        fn may_fail() -> Result<(), AnalysisError> {
            Err(AnalysisError::MissingFeatures {
                id: "ref-1".to_string(),
            })
        }

        fn caller() -> Result<(), TrainerError> {
            may_fail()?;
            Ok(())
        }

        match caller() {
            Err(TrainerError::Analysis(AnalysisError::MissingFeatures { id })) => {
                assert_eq!(id, "ref-1")
            }
            other => panic!("Expected MissingFeatures, got {:?}", other),
        }
    }
}
