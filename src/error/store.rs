// Reference store error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Reference store error code constants
///
/// Error code range: 2001-2006
pub struct StoreErrorCodes {}

impl StoreErrorCodes {
    /// No profile stored under the requested id
    pub const REFERENCE_NOT_FOUND: i32 = 2001;

    /// Persisted profile failed to parse
    pub const CORRUPT_RECORD: i32 = 2002;

    /// Temp write or rename failed
    pub const STORE_WRITE_FAILED: i32 = 2003;

    /// Storage directory could not be created or scanned
    pub const STORAGE_UNAVAILABLE: i32 = 2004;

    /// Store map lock was poisoned
    pub const LOCK_POISONED: i32 = 2005;

    /// Requested profile state transition is not allowed
    pub const INVALID_TRANSITION: i32 = 2006;
}

/// Log a store error with structured context
pub fn log_store_error(err: &StoreError, context: &str) {
    error!(
        "Store error in {}: code={}, component=ReferenceStore, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Reference store errors
///
/// Error code ranges: 2001-2006
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Lookup by id missed
    ReferenceNotFound { id: String },

    /// Persisted record could not be parsed (skipped during load)
    CorruptRecord { path: String, reason: String },

    /// Durable write did not complete; in-memory state was left untouched
    StoreWriteFailed { path: String, reason: String },

    /// Storage directory is missing or unreadable
    StorageUnavailable { path: String, reason: String },

    /// Store RwLock/Mutex was poisoned
    LockPoisoned,

    /// Profile lifecycle only moves forward
    InvalidTransition {
        id: String,
        from: String,
        to: String,
    },
}

impl ErrorCode for StoreError {
    fn code(&self) -> i32 {
        match self {
            StoreError::ReferenceNotFound { .. } => StoreErrorCodes::REFERENCE_NOT_FOUND,
            StoreError::CorruptRecord { .. } => StoreErrorCodes::CORRUPT_RECORD,
            StoreError::StoreWriteFailed { .. } => StoreErrorCodes::STORE_WRITE_FAILED,
            StoreError::StorageUnavailable { .. } => StoreErrorCodes::STORAGE_UNAVAILABLE,
            StoreError::LockPoisoned => StoreErrorCodes::LOCK_POISONED,
            StoreError::InvalidTransition { .. } => StoreErrorCodes::INVALID_TRANSITION,
        }
    }

    fn message(&self) -> String {
        match self {
            StoreError::ReferenceNotFound { id } => format!("Reference not found: {}", id),
            StoreError::CorruptRecord { path, reason } => {
                format!("Corrupt reference record {}: {}", path, reason)
            }
            StoreError::StoreWriteFailed { path, reason } => {
                format!("Failed to write reference {}: {}", path, reason)
            }
            StoreError::StorageUnavailable { path, reason } => {
                format!("Reference storage {} unavailable: {}", path, reason)
            }
            StoreError::LockPoisoned => "Reference store lock poisoned".to_string(),
            StoreError::InvalidTransition { id, from, to } => {
                format!("Reference {} cannot move from {} to {}", id, from, to)
            }
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StoreError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for StoreError {}
