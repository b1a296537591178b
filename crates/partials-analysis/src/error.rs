//! Error types for analysis, tracking, and export operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while configuring or running an analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A configuration value is out of its valid range.
    #[error("invalid configuration '{param}': {reason}")]
    InvalidConfig {
        /// Name of the offending parameter.
        param: &'static str,
        /// Description of why the value is invalid.
        reason: String,
    },

    /// An f0 track and its time vector have different lengths.
    #[error("f0 track has {f0} values but {times} time points")]
    F0Length {
        /// Number of f0 values.
        f0: usize,
        /// Number of time points.
        times: usize,
    },

    /// Per-frame series of a partial track have different lengths.
    #[error("track series lengths differ: freq={freq}, mag={mag}, phase={phase}")]
    SeriesLength {
        /// Length of the frequency series.
        freq: usize,
        /// Length of the magnitude series.
        mag: usize,
        /// Length of the phase series.
        phase: usize,
    },

    /// A partial track needs at least one point.
    #[error("track series is empty")]
    EmptySeries,

    /// Prepending would move a track before frame 0.
    #[error("cannot prepend a point before frame 0")]
    PrependBeforeStart,

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Failed to serialize JSON
    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    /// Create an invalid configuration error.
    pub fn invalid_config(param: &'static str, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidConfig {
            param,
            reason: reason.into(),
        }
    }

    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalysisError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalysisError::WriteFile {
            path: path.into(),
            source,
        }
    }
}

/// Convenience result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
