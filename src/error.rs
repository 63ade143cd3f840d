//! Error types for runlist
//!
//! Centralized error handling using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// All error types that can occur in runlist
#[derive(Debug, Error)]
pub enum RunListError {
    /// Indexed access walked off the end of the sequence
    #[error("Index out of range: {index}")]
    IndexOutOfRange { index: usize },

    /// Job not present in the loaded history
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// History directory does not exist
    #[error("History not found: {}", .0.display())]
    HistoryNotFound(PathBuf),

    /// A history record could not be turned into a build
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for runlist operations
pub type Result<T> = std::result::Result<T, RunListError>;
