//! Canonical water-year timestamp grid.
//!
//! A water year `Y` runs from October 1 of `Y - 1` up to (not including)
//! October 1 of `Y`. The grid covers that interval at a fixed 15-minute step
//! and is the shape shared by every column of the merged output.

use crate::constants::{
    GRID_STEP_MINUTES, OUTPUT_DATE_FORMAT, OUTPUT_TIME_FORMAT, WATER_YEAR_START_MONTH,
};
use crate::error::{AquariusError, Result};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use std::fmt;

/// Water year named for the calendar year in which it ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaterYear {
    year: i32,
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl WaterYear {
    /// Validate `year` and resolve its bounds
    pub fn new(year: i32) -> Result<Self> {
        let previous = year
            .checked_sub(1)
            .ok_or_else(|| AquariusError::InvalidWaterYear {
                year,
                reason: "preceding calendar year is not representable".to_string(),
            })?;

        let start = october_first(previous).ok_or_else(|| AquariusError::InvalidWaterYear {
            year,
            reason: format!("October 1, {} is not a valid date", previous),
        })?;
        let end = october_first(year).ok_or_else(|| AquariusError::InvalidWaterYear {
            year,
            reason: format!("October 1, {} is not a valid date", year),
        })?;

        Ok(Self { year, start, end })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Inclusive start, October 1 of the preceding year at midnight
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Exclusive end, October 1 of the named year at midnight
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }
}

impl fmt::Display for WaterYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WY{}", self.year)
    }
}

fn october_first(year: i32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, WATER_YEAR_START_MONTH, 1)?.and_hms_opt(0, 0, 0)
}

/// Ordered, gap-free timestamps covering one water year
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalGrid {
    water_year: WaterYear,
    step: TimeDelta,
    timestamps: Vec<NaiveDateTime>,
}

impl CanonicalGrid {
    /// Build the 15-minute grid for a water year
    pub fn for_water_year(water_year: WaterYear) -> Self {
        let step = TimeDelta::minutes(GRID_STEP_MINUTES);
        let timestamps = datetime_range(water_year.start(), water_year.end(), step).collect();

        Self {
            water_year,
            step,
            timestamps,
        }
    }

    pub fn water_year(&self) -> WaterYear {
        self.water_year
    }

    pub fn step(&self) -> TimeDelta {
        self.step
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn iter(&self) -> impl Iterator<Item = &NaiveDateTime> {
        self.timestamps.iter()
    }

    pub fn first(&self) -> Option<NaiveDateTime> {
        self.timestamps.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDateTime> {
        self.timestamps.last().copied()
    }

    /// Date, time and minute-of-day columns for every grid entry
    pub fn time_columns(&self) -> TimeColumns {
        TimeColumns::from_timestamps(&self.timestamps)
    }
}

/// Half-open range `[start, end)` stepping by `step`
fn datetime_range(
    start: NaiveDateTime,
    end: NaiveDateTime,
    step: TimeDelta,
) -> impl Iterator<Item = NaiveDateTime> {
    std::iter::successors(Some(start), move |current| current.checked_add_signed(step))
        .take_while(move |current| *current < end)
}

/// Derived per-entry time columns of the SD1 output
#[derive(Debug, Clone, PartialEq)]
pub struct TimeColumns {
    /// `MM/DD/YY`
    pub dates: Vec<String>,
    /// `HH:MM`
    pub times: Vec<String>,
    /// Minutes since local midnight: 0, 15, ... 1425
    pub minutes: Vec<u32>,
}

impl TimeColumns {
    pub fn from_timestamps(timestamps: &[NaiveDateTime]) -> Self {
        let mut dates = Vec::with_capacity(timestamps.len());
        let mut times = Vec::with_capacity(timestamps.len());
        let mut minutes = Vec::with_capacity(timestamps.len());

        for ts in timestamps {
            dates.push(ts.format(OUTPUT_DATE_FORMAT).to_string());
            times.push(ts.format(OUTPUT_TIME_FORMAT).to_string());
            minutes.push(minute_of_day(ts));
        }

        Self {
            dates,
            times,
            minutes,
        }
    }

    pub fn len(&self) -> usize {
        self.minutes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.minutes.is_empty()
    }
}

/// Minutes elapsed since midnight of the timestamp's own day
pub fn minute_of_day(ts: &NaiveDateTime) -> u32 {
    ts.hour() * 60 + ts.minute()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MINUTES_PER_DAY;

    fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn expected_len(water_year: i32) -> usize {
        let wy = WaterYear::new(water_year).unwrap();
        ((wy.end() - wy.start()).num_minutes() / GRID_STEP_MINUTES) as usize
    }

    #[test]
    fn test_grid_length_common_year() {
        let grid = CanonicalGrid::for_water_year(WaterYear::new(2019).unwrap());
        assert_eq!(grid.len(), expected_len(2019));
        assert_eq!(grid.len(), 365 * 96);
    }

    #[test]
    fn test_grid_length_leap_year() {
        // WY2020 contains February 29, 2020
        let grid = CanonicalGrid::for_water_year(WaterYear::new(2020).unwrap());
        assert_eq!(grid.len(), expected_len(2020));
        assert_eq!(grid.len(), 366 * 96);
    }

    #[test]
    fn test_grid_bounds() {
        let grid = CanonicalGrid::for_water_year(WaterYear::new(2020).unwrap());

        assert_eq!(grid.first(), Some(datetime(2019, 10, 1, 0, 0)));
        assert_eq!(grid.last(), Some(datetime(2020, 9, 30, 23, 45)));
    }

    #[test]
    fn test_grid_strictly_increasing_uniform_step() {
        let grid = CanonicalGrid::for_water_year(WaterYear::new(2021).unwrap());

        assert_eq!(grid.step(), TimeDelta::minutes(15));
        for pair in grid.timestamps().windows(2) {
            assert_eq!(pair[1] - pair[0], grid.step());
        }
    }

    #[test]
    fn test_unrepresentable_water_year() {
        let result = WaterYear::new(i32::MIN);
        assert!(matches!(
            result,
            Err(AquariusError::InvalidWaterYear { year: i32::MIN, .. })
        ));

        let result = WaterYear::new(i32::MAX);
        assert!(matches!(result, Err(AquariusError::InvalidWaterYear { .. })));
    }

    #[test]
    fn test_time_column_formats() {
        let columns = TimeColumns::from_timestamps(&[
            datetime(2019, 10, 1, 0, 0),
            datetime(2020, 2, 29, 13, 45),
        ]);

        assert_eq!(columns.dates, vec!["10/01/19", "02/29/20"]);
        assert_eq!(columns.times, vec!["00:00", "13:45"]);
        assert_eq!(columns.minutes, vec![0, 825]);
    }

    #[test]
    fn test_minute_of_day_resets_each_day() {
        let grid = CanonicalGrid::for_water_year(WaterYear::new(2020).unwrap());
        let columns = grid.time_columns();

        assert_eq!(columns.len(), grid.len());
        for (ts, minutes) in grid.iter().zip(&columns.minutes) {
            assert!(*minutes < MINUTES_PER_DAY);
            if ts.hour() == 0 && ts.minute() == 0 {
                assert_eq!(*minutes, 0);
            }
        }
        for pair in columns.minutes.windows(2) {
            if pair[1] != 0 {
                assert_eq!(pair[1], pair[0] + 15);
            } else {
                assert_eq!(pair[0], 1425);
            }
        }
    }

    #[test]
    fn test_minute_of_day_depends_on_time_not_index() {
        // A grid that starts mid-day still reports clock minutes
        let columns = TimeColumns::from_timestamps(&[
            datetime(2020, 3, 1, 23, 30),
            datetime(2020, 3, 1, 23, 45),
            datetime(2020, 3, 2, 0, 0),
            datetime(2020, 3, 2, 0, 15),
        ]);
        assert_eq!(columns.minutes, vec![1410, 1425, 0, 15]);
    }
}
