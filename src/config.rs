//! Run configuration and validation.
//!
//! A single [`RunConfig`] carries everything the pipeline needs: the water
//! year, input directory, output path and the processing knobs.

use crate::constants::{DEFAULT_FILE_PATTERN, MAX_DEFAULT_CONCURRENT_FILES};
use crate::error::{AquariusError, Result};
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Fixed-column SD1 CSV
    Csv,
    /// Same columns written as Parquet
    Parquet,
}

impl OutputFormat {
    /// Infer the format from the output file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => OutputFormat::Parquet,
            _ => OutputFormat::Csv,
        }
    }
}

/// Supported compression algorithms for parquet output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }

    /// Parse a CLI compression name
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "snappy" => Ok(CompressionAlgorithm::Snappy),
            "zstd" => Ok(CompressionAlgorithm::Zstd),
            "lz4" => Ok(CompressionAlgorithm::Lz4),
            "none" | "uncompressed" => Ok(CompressionAlgorithm::Uncompressed),
            other => Err(AquariusError::Configuration {
                message: format!(
                    "Unknown compression '{}' (expected snappy, zstd, lz4 or none)",
                    other
                ),
            }),
        }
    }
}

/// Configuration for one processing run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Water year to build the grid for
    pub water_year: i32,

    /// Directory holding the AQUARIUS exports
    pub input_dir: PathBuf,

    /// Output file
    pub output_path: PathBuf,

    /// Output format
    pub output_format: OutputFormat,

    /// Glob pattern selecting export files inside `input_dir`
    pub file_pattern: String,

    /// Search subdirectories of `input_dir` as well
    pub recursive: bool,

    /// Maximum files read and aligned concurrently; 1 is fully sequential
    pub max_concurrent_files: usize,

    /// Compression used for parquet output
    pub compression: CompressionAlgorithm,
}

impl RunConfig {
    /// Create a configuration with defaults; the format follows the output extension
    pub fn new(water_year: i32, input_dir: PathBuf, output_path: PathBuf) -> Self {
        let output_format = OutputFormat::from_path(&output_path);
        Self {
            water_year,
            input_dir,
            output_path,
            output_format,
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            recursive: false,
            max_concurrent_files: num_cpus::get().clamp(1, MAX_DEFAULT_CONCURRENT_FILES),
            compression: CompressionAlgorithm::Snappy,
        }
    }

    /// Set the output format explicitly
    pub fn with_output_format(mut self, output_format: OutputFormat) -> Self {
        self.output_format = output_format;
        self
    }

    /// Set the file selection pattern
    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = pattern.into();
        self
    }

    /// Search subdirectories
    pub fn with_recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    /// Set maximum concurrent files
    pub fn with_max_concurrent_files(mut self, max_files: usize) -> Self {
        self.max_concurrent_files = max_files;
        self
    }

    /// Set parquet compression
    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.compression = compression;
        self
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_files == 0 {
            return Err(AquariusError::Configuration {
                message: "max_concurrent_files must be at least 1".to_string(),
            });
        }

        if self.file_pattern.trim().is_empty() {
            return Err(AquariusError::Configuration {
                message: "file pattern must not be empty".to_string(),
            });
        }

        if self.output_path.as_os_str().is_empty() {
            return Err(AquariusError::Configuration {
                message: "output path must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
