//! Error types for the mocap library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for mocap operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Input file does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Archive is missing required fields or its fields disagree on shape
    #[error("Malformed archive: {0}")]
    MalformedArchive(String),

    /// A row does not have the width of the rows before it
    #[error("Ragged table: row {row} has {actual} columns, expected {expected}")]
    RaggedTable { row: usize, expected: usize, actual: usize },

    /// A text field could not be parsed as a number
    #[error("Invalid number {value:?} at line {line}, column {column}")]
    Parse { line: usize, column: usize, value: String },

    /// Operation needs at least one frame
    #[error("Empty input: {0} requires at least one frame")]
    EmptyInput(&'static str),

    /// Operation needs more frames than the table has
    #[error("Insufficient frames: need at least {required}, got {actual}")]
    InsufficientFrames { required: usize, actual: usize },

    /// Two tables disagree on frame count where they must match
    #[error("Frame count mismatch: expected {expected}, got {actual}")]
    FrameCountMismatch { expected: usize, actual: usize },

    /// NaN or infinity where a finite number is required
    #[error("Non-finite value {value} in {field} at frame {frame}, column {column}")]
    NonFinite { field: &'static str, frame: usize, column: usize, value: f64 },

    /// Bad argument or configuration value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON syntax error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create a malformed archive error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedArchive(msg.into())
    }

    /// Create an invalid argument error.
    pub fn invalid_arg(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Result type alias for mocap operations.
pub type Result<T> = std::result::Result<T, Error>;
