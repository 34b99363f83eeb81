//! AQUARIUS export parsing.
//!
//! Turns one export document into a [`SourceRecord`]. Every line that does
//! not start with a header prefix is a data line; a data line whose
//! timestamp cannot be parsed invalidates the whole file.

use crate::constants::{
    FIELD_SEPARATOR, HEADER_LINE_PREFIXES, TIMESTAMP_FIELD, TIMESTAMP_FORMAT, VALUE_FIELD,
};
use crate::error::{AquariusError, Result};
use crate::header::parse_header;
use crate::models::{Parameter, RawReading, SourceRecord};
use chrono::NaiveDateTime;
use std::path::Path;
use tracing::debug;

/// Read and parse one export file.
///
/// The file is read in full and closed before parsing starts. Read failures
/// are reported as file-scoped so the caller can skip the file.
pub async fn read_source_file(file_path: &Path) -> Result<SourceRecord> {
    let text = tokio::fs::read_to_string(file_path)
        .await
        .map_err(|e| AquariusError::ProcessingFailed {
            path: file_path.to_path_buf(),
            reason: format!("Failed to read file: {}", e),
        })?;

    parse_document(&text, file_path)
}

/// Parse the text of one export
pub fn parse_document(text: &str, file_path: &Path) -> Result<SourceRecord> {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
    let lines: Vec<&str> = text.lines().collect();
    let header = parse_header(&lines, file_path)?;

    let mut readings = Vec::new();
    for (line_num, line) in lines.iter().enumerate() {
        if is_header_line(line) || line.trim().is_empty() {
            continue;
        }
        readings.push(parse_data_line(line, line_num + 1, file_path)?);
    }

    let parameter = Parameter::from_label(&header.param_label);
    if parameter.is_none() {
        debug!(
            "Unrecognized parameter '{}' in {}",
            header.param_label,
            file_path.display()
        );
    }

    debug!(
        "Parsed {} readings from {}",
        readings.len(),
        file_path.display()
    );

    Ok(SourceRecord {
        source: file_path.to_path_buf(),
        station: header.station,
        param_label: header.param_label,
        parameter,
        units: header.units,
        readings,
    })
}

const BYTE_ORDER_MARK: char = '\u{FEFF}';

fn is_header_line(line: &str) -> bool {
    HEADER_LINE_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

/// Parse `<utc>,<local timestamp>,<value>,...` into a raw reading
fn parse_data_line(line: &str, line_num: usize, file_path: &Path) -> Result<RawReading> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() <= VALUE_FIELD {
        return Err(AquariusError::MalformedDataLine {
            path: file_path.to_path_buf(),
            line: line_num,
            reason: format!(
                "expected at least {} fields, found {}",
                VALUE_FIELD + 1,
                fields.len()
            ),
        });
    }

    let timestamp_str = fields[TIMESTAMP_FIELD].trim();
    let timestamp = NaiveDateTime::parse_from_str(timestamp_str, TIMESTAMP_FORMAT).map_err(
        |source| AquariusError::InvalidTimestamp {
            path: file_path.to_path_buf(),
            line: line_num,
            value: timestamp_str.to_string(),
            source,
        },
    )?;

    Ok(RawReading {
        timestamp,
        value: fields[VALUE_FIELD].to_string(),
    })
}
