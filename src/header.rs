//! AQUARIUS export header parsing and metadata extraction.
//!
//! The header block is positional: the producer line carries the station
//! identifier after `@`, and the station name, value units and parameter
//! name sit on fixed lines as `Label: value,` pairs.

use crate::constants::{
    FIELD_SEPARATOR, HEADER_VALUE_SEPARATOR, PRODUCER_MARKER, STATION_DELIMITER, STATION_ID_LEN,
    header_lines,
};
use crate::error::{AquariusError, Result};
use crate::models::StationInfo;
use std::path::Path;
use tracing::debug;

/// Metadata decoded from the header block of one export
#[derive(Debug, Clone, PartialEq)]
pub struct SourceHeader {
    pub station: StationInfo,
    pub param_label: String,
    pub units: String,
}

/// Whether a first line identifies the AQUARIUS producer
pub fn has_producer_marker(first_line: &str) -> bool {
    first_line.contains(PRODUCER_MARKER)
}

/// Extract header metadata from the leading lines of an export
pub fn parse_header(lines: &[&str], file_path: &Path) -> Result<SourceHeader> {
    let first_line = lines.first().copied().unwrap_or_default();
    if !has_producer_marker(first_line) {
        return Err(AquariusError::UnrecognizedFormat {
            path: file_path.to_path_buf(),
        });
    }

    let mut builder = SourceHeaderBuilder::new();
    for (line_num, line) in lines.iter().enumerate().take(header_lines::PARAMETER + 1) {
        builder.parse_line(line_num, line);
    }

    let header = builder.build(file_path)?;

    debug!(
        "Parsed header for {}: station={}, parameter='{}', units='{}'",
        file_path.display(),
        header.station.station,
        header.param_label,
        header.units
    );

    Ok(header)
}

/// Builder for header metadata extraction
struct SourceHeaderBuilder {
    station: Option<String>,
    name: Option<String>,
    units: Option<String>,
    param_label: Option<String>,
}

impl SourceHeaderBuilder {
    fn new() -> Self {
        Self {
            station: None,
            name: None,
            units: None,
            param_label: None,
        }
    }

    fn parse_line(&mut self, line_num: usize, line: &str) {
        match line_num {
            header_lines::PRODUCER => {
                self.station = parse_station_id(line);
            }
            header_lines::STATION_NAME => {
                self.name = parse_labelled_value(line);
            }
            header_lines::UNITS => {
                self.units = parse_labelled_value(line);
            }
            header_lines::PARAMETER => {
                self.param_label = parse_labelled_value(line);
            }
            _ => {}
        }
    }

    fn build(self, file_path: &Path) -> Result<SourceHeader> {
        let station = self
            .station
            .ok_or_else(|| AquariusError::HeaderParsingFailed {
                path: file_path.to_path_buf(),
                reason: format!(
                    "Missing {}-character station identifier after '{}' on line 1",
                    STATION_ID_LEN, STATION_DELIMITER
                ),
            })?;

        let name = self.name.ok_or_else(|| AquariusError::HeaderParsingFailed {
            path: file_path.to_path_buf(),
            reason: format!("Missing station name on line {}", header_lines::STATION_NAME + 1),
        })?;

        let units = self.units.ok_or_else(|| AquariusError::HeaderParsingFailed {
            path: file_path.to_path_buf(),
            reason: format!("Missing value units on line {}", header_lines::UNITS + 1),
        })?;

        let param_label = self
            .param_label
            .ok_or_else(|| AquariusError::HeaderParsingFailed {
                path: file_path.to_path_buf(),
                reason: format!("Missing parameter name on line {}", header_lines::PARAMETER + 1),
            })?;

        Ok(SourceHeader {
            station: StationInfo { station, name },
            param_label,
            units,
        })
    }
}

/// First `STATION_ID_LEN` characters following the station delimiter
fn parse_station_id(line: &str) -> Option<String> {
    let (_, rest) = line.split_once(STATION_DELIMITER)?;
    let station: String = rest.chars().take(STATION_ID_LEN).collect();

    (station.chars().count() == STATION_ID_LEN).then_some(station)
}

/// Text after the first `:` and before the next `,`, trimmed
fn parse_labelled_value(line: &str) -> Option<String> {
    let (_, rest) = line.split_once(HEADER_VALUE_SEPARATOR)?;
    let value = rest.split(FIELD_SEPARATOR).next().unwrap_or_default().trim();

    Some(value.to_string())
}
