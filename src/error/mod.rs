//! Error handling for the surveillance engine.
//!
//! Only boundary failures are errors. Insufficient data and out-of-range
//! parameters are ordinary outcomes and are modelled as result variants
//! (see [`crate::models::MethodStatus`] and
//! [`crate::parameters::ParameterAdjustment`]).

pub mod util;

use std::io;
use std::path::PathBuf;

/// Specialized error type for the surveillance engine
#[derive(Debug, thiserror::Error)]
pub enum SurveillanceError {
    /// Error opening or reading an input file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error reading an input file, with the offending path
    #[error("IO error for {path}: {message}")]
    File {
        /// Path involved in the failure
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// Error decoding JSON input
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A raw row could not be turned into an observation
    #[error("Malformed row {index}: {reason}")]
    MalformedRow {
        /// Zero-based position of the row in its source
        index: usize,
        /// What was missing or invalid
        reason: String,
    },

    /// A week key did not match `YYYY-W##` or named a week that does not exist
    #[error("Invalid week key: {0}")]
    InvalidWeekKey(String),

    /// No signal is registered under the requested id or test code
    #[error("Unknown signal: {0}")]
    UnknownSignal(String),

    /// Method name outside `ewma|cusum|farrington`
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// A value that must already have been validated upstream was not.
    /// Reaching this indicates an ingestion-layer bug.
    #[error("Contract violation: {0}")]
    ContractViolation(String),
}

impl SurveillanceError {
    /// Create a file error with the path that caused it
    pub fn file(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::File {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a malformed row error
    pub fn malformed_row(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRow {
            index,
            reason: reason.into(),
        }
    }
}

/// Result type for surveillance operations
pub type Result<T> = std::result::Result<T, SurveillanceError>;
