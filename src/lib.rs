//! AQUARIUS Processor Library
//!
//! A Rust library for merging per-parameter AQUARIUS Time-Series exports
//! from one gauging station into a single 15-minute table covering a
//! water year (October 1 through September 30).
//!
//! This library provides tools for:
//! - Building the canonical 15-minute grid for a water year
//! - Parsing AQUARIUS export headers and data rows
//! - Aligning irregular readings onto the grid by exact timestamp match
//! - Merging parameters into fixed output columns with station checks
//! - Writing the SD1 table as CSV or Parquet

pub mod align;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod grid;
pub mod header;
pub mod models;
pub mod parser;
pub mod processor;
pub mod store;

// Re-export commonly used types
pub use config::{CompressionAlgorithm, OutputFormat, RunConfig};
pub use error::{AquariusError, Result};
pub use grid::{CanonicalGrid, WaterYear};
pub use models::{
    AlignedSeries, FileEvent, Parameter, ProcessingStats, SeriesSummary, SourceRecord, StationInfo,
};
pub use processor::WaterYearProcessor;
pub use store::{MergeStore, UpdateOutcome};
