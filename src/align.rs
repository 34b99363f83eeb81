//! Alignment of parsed readings onto the canonical grid.
//!
//! Readings are indexed by timestamp (last occurrence wins) and every grid
//! position is resolved by exact timestamp equality. Positions without a
//! reading, and readings that do not coerce to a number, are missing.

use crate::grid::CanonicalGrid;
use crate::models::{AlignedSeries, SeriesSummary, SourceRecord};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Diagnostics for one alignment
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AlignmentReport {
    /// Readings in the source record
    pub readings: usize,
    /// Readings sharing a timestamp with a later reading
    pub duplicates: usize,
    /// Distinct timestamps that are not grid entries
    pub off_grid: usize,
    /// Grid positions with a matching timestamp
    pub matched: usize,
    /// Matched positions whose raw value is not numeric
    pub coercion_failures: usize,
    /// Statistics over the aligned values, `None` when nothing aligned
    pub summary: Option<SeriesSummary>,
}

impl AlignmentReport {
    /// Grid positions holding a value after coercion
    pub fn filled(&self) -> usize {
        self.matched - self.coercion_failures
    }
}

/// Align a source record onto the grid
#[instrument(skip_all, fields(file = %record.source.display(), readings = record.readings.len()))]
pub fn align(grid: &CanonicalGrid, record: &SourceRecord) -> (AlignedSeries, AlignmentReport) {
    let mut by_timestamp: HashMap<NaiveDateTime, &str> =
        HashMap::with_capacity(record.readings.len());
    for reading in &record.readings {
        by_timestamp.insert(reading.timestamp, reading.value.as_str());
    }
    let duplicates = record.readings.len() - by_timestamp.len();

    let mut matched = 0usize;
    let mut coercion_failures = 0usize;
    let values: Vec<Option<f64>> = grid
        .iter()
        .map(|ts| {
            let raw = by_timestamp.get(ts)?;
            matched += 1;
            let value = coerce_value(raw);
            if value.is_none() {
                coercion_failures += 1;
            }
            value
        })
        .collect();

    let series = AlignedSeries::new(values);
    let report = AlignmentReport {
        readings: record.readings.len(),
        duplicates,
        off_grid: by_timestamp.len() - matched,
        matched,
        coercion_failures,
        summary: series.summary(),
    };

    debug!(
        "Aligned {} of {} grid positions ({} off-grid, {} duplicates, {} non-numeric)",
        report.filled(),
        grid.len(),
        report.off_grid,
        report.duplicates,
        report.coercion_failures
    );

    (series, report)
}

/// Coerce a raw export value to a number; blanks and quality flags are missing
pub fn coerce_value(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
