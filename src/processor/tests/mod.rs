//! Integration tests for the processor module
//!
//! Tests the complete pipeline against directories of synthetic AQUARIUS
//! exports.


use crate::models::Parameter;
use std::fs;
use std::path::{Path, PathBuf};

pub const STATION: &str = "03254550";
pub const LOCATION: &str = "Licking River at Catawba, KY";

/// Header followed by `Timestamp,Value` rows in the AQUARIUS layout
pub fn export_text(station: &str, location: &str, param: &str, units: &str, rows: &[(&str, &str)]) -> String {
    let mut text = format!(
        "# Export from AQUARIUS Time-Series: {param}.{units}@{station}\n\
         # Time-series identifier: {param}.{units}@{station}\n\
         # Exported: 2020-10-05 09:12:44\n\
         # Location: {location}\n\
         # Time zone: UTC-05:00\n\
         # Value units: {units},\n\
         # Parameter: {param},\n\
         ISO 8601 UTC, Timestamp (UTC-05:00), Value, Approval Level, Grade Code, Qualifiers\n"
    );
    for (timestamp, value) in rows {
        text.push_str(&format!("2000-01-01T00:00:00Z,{timestamp},{value},Approved,50,\n"));
    }
    text
}

/// Write an export for the default station into `dir`
pub fn write_export(dir: &Path, name: &str, param: &str, units: &str, rows: &[(&str, &str)]) -> PathBuf {
    write_station_export(dir, name, STATION, param, units, rows)
}

pub fn write_station_export(
    dir: &Path,
    name: &str,
    station: &str,
    param: &str,
    units: &str,
    rows: &[(&str, &str)],
) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, export_text(station, LOCATION, param, units, rows)).unwrap();
    path
}

/// Output CSV split into rows of cells, header first
pub fn read_output(path: &Path) -> Vec<Vec<String>> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect()
}

/// Cell index of a parameter column in the output
pub fn column_index(parameter: Parameter) -> usize {
    8 + Parameter::ALL
        .iter()
        .position(|p| *p == parameter)
        .unwrap()
}

/// Output row (header excluded) of a WY2020 timestamp given as days since
/// 2019-10-01 plus hour and minute
pub fn wy2020_row(days: usize, hour: usize, minute: usize) -> usize {
    1 + days * 96 + hour * 4 + minute / 15
}

/// Numeric value of an output cell; empty cells are missing
pub fn cell_value(cell: &str) -> Option<f64> {
    if cell.is_empty() {
        None
    } else {
        Some(cell.parse().unwrap())
    }
}
