//! Error handling for AQUARIUS processing operations.
//!
//! Separates run-terminating configuration failures from failures scoped to
//! a single input file, which the pipeline reports and skips.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AquariusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to read directory entry: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("Invalid water year {year}: {reason}")]
    InvalidWaterYear { year: i32, reason: String },

    #[error("Input directory not found: {path}")]
    InputDirectoryNotFound { path: PathBuf },

    #[error("Unrecognized format in file: {path} - first line lacks the AQUARIUS marker")]
    UnrecognizedFormat { path: PathBuf },

    #[error("Header parsing failed for file: {path} - {reason}")]
    HeaderParsingFailed { path: PathBuf, reason: String },

    #[error("Invalid timestamp '{value}' on line {line} of file: {path}")]
    InvalidTimestamp {
        path: PathBuf,
        line: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Malformed data line {line} in file: {path} - {reason}")]
    MalformedDataLine {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Station mismatch in file: {path} - expected {expected}, found {found}")]
    StationMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("No usable AQUARIUS files found in: {path}")]
    NoStationData { path: PathBuf },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Processing failed for file: {path} - {reason}")]
    ProcessingFailed { path: PathBuf, reason: String },

    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl AquariusError {
    /// Whether the error only invalidates one input file.
    ///
    /// File-scoped errors are reported and the run moves on to the next
    /// file; anything else terminates the run.
    pub fn is_file_scoped(&self) -> bool {
        matches!(
            self,
            AquariusError::UnrecognizedFormat { .. }
                | AquariusError::HeaderParsingFailed { .. }
                | AquariusError::InvalidTimestamp { .. }
                | AquariusError::MalformedDataLine { .. }
                | AquariusError::StationMismatch { .. }
                | AquariusError::ProcessingFailed { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AquariusError>;
