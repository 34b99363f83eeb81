//! Core data structures and types for AQUARIUS processing.
//!
//! Defines the parameter enumeration, parsed source records, aligned series,
//! summary statistics and the per-file events reported during a run.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Parameters carried by the SD1 output, in output column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Parameter {
    GageHeight,
    Discharge,
    Precipitation,
    Temperature,
    DissolvedOxygen,
    Ph,
    SpecificConductance,
    Turbidity,
    Velocity,
    Nitrate,
}

impl Parameter {
    /// Every parameter, in output column order
    pub const ALL: [Parameter; 10] = [
        Parameter::GageHeight,
        Parameter::Discharge,
        Parameter::Precipitation,
        Parameter::Temperature,
        Parameter::DissolvedOxygen,
        Parameter::Ph,
        Parameter::SpecificConductance,
        Parameter::Turbidity,
        Parameter::Velocity,
        Parameter::Nitrate,
    ];

    /// Match an AQUARIUS parameter label exactly
    pub fn from_label(label: &str) -> Option<Self> {
        Parameter::ALL.into_iter().find(|p| p.label() == label)
    }

    /// Parameter label as written in the AQUARIUS header
    pub fn label(&self) -> &'static str {
        match self {
            Parameter::Precipitation => "Precipitation",
            Parameter::GageHeight => "Gage height",
            Parameter::Discharge => "Discharge",
            Parameter::Temperature => "Temperature",
            Parameter::DissolvedOxygen => "Dissolved oxygen",
            Parameter::Ph => "pH",
            Parameter::SpecificConductance => "Specific cond at 25C",
            Parameter::Turbidity => "Turbidity",
            Parameter::Velocity => "Mean water velocity",
            Parameter::Nitrate => "NO3+NO2",
        }
    }

    /// SD1 output column name
    pub fn column_name(&self) -> &'static str {
        match self {
            Parameter::GageHeight => "gageheight_ft",
            Parameter::Discharge => "discharge_cfs",
            Parameter::Precipitation => "precip_in",
            Parameter::Temperature => "temp_c",
            Parameter::DissolvedOxygen => "do_mgL",
            // Legacy SD1 headers wrote " pH_su"; the space is dropped here
            Parameter::Ph => "pH_su",
            Parameter::SpecificConductance => "conductance_umhos",
            Parameter::Turbidity => "turb_ntu",
            Parameter::Velocity => "Velocity",
            Parameter::Nitrate => "Nitrate",
        }
    }

    /// Human-readable description with display units
    pub fn description(&self) -> &'static str {
        match self {
            Parameter::GageHeight => "Gage height (ft)",
            Parameter::Discharge => "Discharge (cfs)",
            Parameter::Precipitation => "Precipitation (in)",
            Parameter::Temperature => "Temperature (deg C)",
            Parameter::DissolvedOxygen => "Dissolved Oxygen (mg/L)",
            Parameter::Ph => "pH",
            Parameter::SpecificConductance => "Specific Conductance @ 25 deg C (uS/cm)",
            Parameter::Turbidity => "Turbidity (FNU)",
            Parameter::Velocity => "Velocity (ft/s)",
            Parameter::Nitrate => "Nitrate (mg/L)",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One timestamped reading exactly as exported, before numeric coercion
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    pub timestamp: NaiveDateTime,
    pub value: String,
}

/// Station identity shared by every file merged into one output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationInfo {
    /// 8-character station identifier
    pub station: String,
    /// Display name
    pub name: String,
}

impl StationInfo {
    /// First whitespace-delimited token of the display name
    pub fn short_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

/// One parsed AQUARIUS export
#[derive(Debug, Clone)]
pub struct SourceRecord {
    /// File the record was read from
    pub source: PathBuf,
    pub station: StationInfo,
    /// Parameter label as exported
    pub param_label: String,
    /// Known parameter matching `param_label`, if any
    pub parameter: Option<Parameter>,
    /// Measured-value units (informational only)
    pub units: String,
    /// Readings in file order; unsorted and possibly duplicated
    pub readings: Vec<RawReading>,
}

/// Values for every canonical grid position; `None` marks a missing value
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSeries {
    values: Vec<Option<f64>>,
}

impl AlignedSeries {
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Self { values }
    }

    /// A series of `len` missing values
    pub fn missing(len: usize) -> Self {
        Self {
            values: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Number of grid positions holding a value
    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn is_all_missing(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Summary statistics, or `None` when every value is missing
    pub fn summary(&self) -> Option<SeriesSummary> {
        SeriesSummary::from_values(self.values.iter().flatten().copied())
    }
}

/// Mean, minimum and maximum over the non-missing values of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl SeriesSummary {
    /// Summarise the given values; `None` for an empty input
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for value in values {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }

        if count == 0 {
            return None;
        }

        Some(Self {
            count,
            mean: sum / count as f64,
            min,
            max,
        })
    }
}

impl fmt::Display for SeriesSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mean {:.2}, min {:.2}, max {:.2} ({} values)",
            self.mean, self.min, self.max, self.count
        )
    }
}

/// Render an optional summary, using "no data" for an all-missing series
pub fn describe_summary(summary: Option<&SeriesSummary>) -> String {
    match summary {
        Some(summary) => summary.to_string(),
        None => "no data".to_string(),
    }
}

/// Outcome of one input file, as reported to progress consumers
#[derive(Debug, Clone, PartialEq)]
pub enum FileEvent {
    /// Column written; `replaced` names the file whose column was overwritten
    Processed {
        path: PathBuf,
        parameter: Parameter,
        summary: Option<SeriesSummary>,
        replaced: Option<PathBuf>,
    },
    /// Parsed and aligned, but the parameter maps to no output column
    UnknownParameter { path: PathBuf, label: String },
    /// File-level parse failure; the file contributed nothing
    Skipped { path: PathBuf, reason: String },
    /// Station differs from the session station; the file contributed nothing
    StationRejected {
        path: PathBuf,
        expected: String,
        found: String,
    },
}

impl FileEvent {
    pub fn path(&self) -> &PathBuf {
        match self {
            FileEvent::Processed { path, .. }
            | FileEvent::UnknownParameter { path, .. }
            | FileEvent::Skipped { path, .. }
            | FileEvent::StationRejected { path, .. } => path,
        }
    }

    /// Whether the event should be surfaced as a warning
    pub fn is_warning(&self) -> bool {
        match self {
            FileEvent::Processed { replaced, .. } => replaced.is_some(),
            _ => true,
        }
    }
}

/// Processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub files_discovered: usize,
    pub files_processed: usize,
    pub files_skipped: usize,
    pub files_rejected: usize,
    pub rows_written: usize,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
    /// Per-file outcomes in processing order
    pub events: Vec<FileEvent>,
    /// Final summary for every output column, in column order
    pub column_summaries: Vec<(Parameter, Option<SeriesSummary>)>,
}

impl ProcessingStats {
    /// Events that should be surfaced as warnings
    pub fn warnings(&self) -> impl Iterator<Item = &FileEvent> {
        self.events.iter().filter(|event| event.is_warning())
    }
}
