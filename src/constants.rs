//! Application constants for the AQUARIUS processor
//!
//! Producer format markers, fixed header positions, grid parameters and the
//! SD1 output column contract.

// =============================================================================
// AQUARIUS Export Format
// =============================================================================

/// Token that must appear on the first line of every AQUARIUS export
pub const PRODUCER_MARKER: &str = "AQUARIUS";

/// Delimiter preceding the station identifier on the first line
pub const STATION_DELIMITER: char = '@';

/// Number of characters making up a station identifier
pub const STATION_ID_LEN: usize = 8;

/// Line prefixes that mark header, comment and column-title lines
pub const HEADER_LINE_PREFIXES: &[&str] = &["#", "ISO"];

/// Fixed (0-indexed) header line positions
pub mod header_lines {
    /// Producer marker and `@station` identifier
    pub const PRODUCER: usize = 0;

    /// Station display name
    pub const STATION_NAME: usize = 3;

    /// Measured-value units
    pub const UNITS: usize = 5;

    /// Parameter name
    pub const PARAMETER: usize = 6;
}

/// Separator between a header label and its value
pub const HEADER_VALUE_SEPARATOR: char = ':';

/// Field separator for header values and data lines
pub const FIELD_SEPARATOR: char = ',';

/// Data line field holding the local timestamp
pub const TIMESTAMP_FIELD: usize = 1;

/// Data line field holding the raw reading
pub const VALUE_FIELD: usize = 2;

/// Timestamp format used by data lines
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Canonical Grid
// =============================================================================

/// Grid step in minutes
pub const GRID_STEP_MINUTES: i64 = 15;

/// Minutes in a calendar day, used for the minute-of-day column
pub const MINUTES_PER_DAY: u32 = 1440;

/// First month of a water year (October)
pub const WATER_YEAR_START_MONTH: u32 = 10;

// =============================================================================
// SD1 Output
// =============================================================================

/// Output date format (`MM/DD/YY`)
pub const OUTPUT_DATE_FORMAT: &str = "%m/%d/%y";

/// Output time format (`HH:MM`)
pub const OUTPUT_TIME_FORMAT: &str = "%H:%M";

/// Output format of the `DT` column
pub const OUTPUT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Station and time columns, in output order.
///
/// Names carry no padding. Legacy SD1 files wrote `" Mins"` and `" pH_su"`
/// with a leading space; this header intentionally drops it.
pub mod columns {
    pub const STATION_NUM: &str = "station_num";
    pub const STATION_NAME: &str = "station_name";
    pub const STATION: &str = "station";
    pub const DATE: &str = "Date";
    pub const TIME: &str = "Time";
    pub const MINS: &str = "Mins";
    pub const DT: &str = "DT";
    pub const DT2: &str = "DT2";
}

/// Default glob for AQUARIUS export files
pub const DEFAULT_FILE_PATTERN: &str = "*.csv";

/// Upper bound on the default number of files read concurrently
pub const MAX_DEFAULT_CONCURRENT_FILES: usize = 8;
