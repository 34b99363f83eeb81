//! In-memory merge of aligned parameter columns.
//!
//! The store owns the canonical grid and one column per known parameter,
//! all initially missing. Updates overwrite whole columns and are only
//! accepted from the station established by the first accepted file.

use crate::error::{AquariusError, Result};
use crate::grid::CanonicalGrid;
use crate::models::{AlignedSeries, Parameter, SourceRecord, StationInfo};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Result of an accepted update
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// Column written for the first time
    Filled(Parameter),
    /// Column overwritten; `previous` supplied the replaced values
    Replaced {
        parameter: Parameter,
        previous: PathBuf,
    },
    /// Station accepted, but the parameter has no output column
    UnknownParameter(String),
}

#[derive(Debug)]
struct Column {
    series: AlignedSeries,
    source: Option<PathBuf>,
}

/// Wide table of parameter columns keyed by the canonical grid
#[derive(Debug)]
pub struct MergeStore {
    grid: CanonicalGrid,
    columns: BTreeMap<Parameter, Column>,
    station: Option<StationInfo>,
}

impl MergeStore {
    /// Create a store with an all-missing column for every parameter
    pub fn new(grid: CanonicalGrid) -> Self {
        let columns = Parameter::ALL
            .into_iter()
            .map(|parameter| {
                let column = Column {
                    series: AlignedSeries::missing(grid.len()),
                    source: None,
                };
                (parameter, column)
            })
            .collect();

        Self {
            grid,
            columns,
            station: None,
        }
    }

    pub fn grid(&self) -> &CanonicalGrid {
        &self.grid
    }

    /// Station established by the first accepted update
    pub fn station(&self) -> Option<&StationInfo> {
        self.station.as_ref()
    }

    pub fn column(&self, parameter: Parameter) -> &AlignedSeries {
        &self.columns[&parameter].series
    }

    /// File that last wrote the column, if any
    pub fn column_source(&self, parameter: Parameter) -> Option<&PathBuf> {
        self.columns[&parameter].source.as_ref()
    }

    /// Columns in output order
    pub fn columns(&self) -> impl Iterator<Item = (Parameter, &AlignedSeries)> {
        self.columns
            .iter()
            .map(|(parameter, column)| (*parameter, &column.series))
    }

    /// Merge one aligned record.
    ///
    /// A record from a different station than the established one is
    /// rejected with [`AquariusError::StationMismatch`] and leaves the store
    /// untouched. A repeated parameter replaces the earlier column in full.
    pub fn update(&mut self, record: &SourceRecord, series: AlignedSeries) -> Result<UpdateOutcome> {
        if series.len() != self.grid.len() {
            return Err(AquariusError::ProcessingFailed {
                path: record.source.clone(),
                reason: format!(
                    "aligned series has {} values, grid has {}",
                    series.len(),
                    self.grid.len()
                ),
            });
        }

        match &self.station {
            Some(expected) if expected.station != record.station.station => {
                return Err(AquariusError::StationMismatch {
                    path: record.source.clone(),
                    expected: expected.station.clone(),
                    found: record.station.station.clone(),
                });
            }
            Some(_) => {}
            None => {
                debug!(
                    "Session station set to {} ({}) by {}",
                    record.station.station,
                    record.station.name,
                    record.source.display()
                );
                self.station = Some(record.station.clone());
            }
        }

        let Some(parameter) = record.parameter else {
            return Ok(UpdateOutcome::UnknownParameter(record.param_label.clone()));
        };

        let column = self
            .columns
            .get_mut(&parameter)
            .ok_or_else(|| AquariusError::ProcessingFailed {
                path: record.source.clone(),
                reason: format!("no column for parameter {}", parameter),
            })?;
        column.series = series;
        let previous = column.source.replace(record.source.clone());

        match previous {
            Some(previous) => {
                warn!(
                    "{} from {} replaces values previously loaded from {}",
                    parameter,
                    record.source.display(),
                    previous.display()
                );
                Ok(UpdateOutcome::Replaced {
                    parameter,
                    previous,
                })
            }
            None => Ok(UpdateOutcome::Filled(parameter)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::WaterYear;

    fn store() -> MergeStore {
        MergeStore::new(CanonicalGrid::for_water_year(WaterYear::new(2020).unwrap()))
    }

    fn record(path: &str, station: &str, label: &str) -> SourceRecord {
        SourceRecord {
            source: PathBuf::from(path),
            station: StationInfo {
                station: station.to_string(),
                name: "Licking River at Catawba".to_string(),
            },
            param_label: label.to_string(),
            parameter: Parameter::from_label(label),
            units: String::new(),
            readings: Vec::new(),
        }
    }

    fn series_with(len: usize, index: usize, value: f64) -> AlignedSeries {
        let mut values = vec![None; len];
        values[index] = Some(value);
        AlignedSeries::new(values)
    }

    #[test]
    fn test_new_store_is_all_missing() {
        let store = store();

        assert!(store.station().is_none());
        for (_, series) in store.columns() {
            assert_eq!(series.len(), store.grid().len());
            assert!(series.is_all_missing());
        }
        assert_eq!(store.columns().count(), Parameter::ALL.len());
    }

    #[test]
    fn test_first_update_sets_station() {
        let mut store = store();
        let len = store.grid().len();

        let outcome = store
            .update(&record("q.csv", "03254550", "Discharge"), series_with(len, 5, 410.0))
            .unwrap();

        assert_eq!(outcome, UpdateOutcome::Filled(Parameter::Discharge));
        assert_eq!(store.station().unwrap().station, "03254550");
        assert_eq!(store.column(Parameter::Discharge).get(5), Some(410.0));
        assert!(store.column(Parameter::GageHeight).is_all_missing());
    }

    #[test]
    fn test_station_mismatch_rejected_without_mutation() {
        let mut store = store();
        let len = store.grid().len();

        store
            .update(&record("gh.csv", "03254550", "Gage height"), series_with(len, 0, 3.1))
            .unwrap();
        let result = store.update(
            &record("other.csv", "03277200", "Gage height"),
            series_with(len, 0, 99.0),
        );

        match result {
            Err(AquariusError::StationMismatch {
                path,
                expected,
                found,
            }) => {
                assert_eq!(path, PathBuf::from("other.csv"));
                assert_eq!(expected, "03254550");
                assert_eq!(found, "03277200");
            }
            other => panic!("Expected StationMismatch, got {:?}", other),
        }
        assert_eq!(store.column(Parameter::GageHeight).get(0), Some(3.1));
        assert_eq!(
            store.column_source(Parameter::GageHeight),
            Some(&PathBuf::from("gh.csv"))
        );
    }

    #[test]
    fn test_repeated_parameter_replaces_column() {
        let mut store = store();
        let len = store.grid().len();

        store
            .update(&record("t1.csv", "03254550", "Temperature"), series_with(len, 1, 10.0))
            .unwrap();
        let outcome = store
            .update(&record("t2.csv", "03254550", "Temperature"), series_with(len, 2, 12.0))
            .unwrap();

        assert_eq!(
            outcome,
            UpdateOutcome::Replaced {
                parameter: Parameter::Temperature,
                previous: PathBuf::from("t1.csv"),
            }
        );
        let column = store.column(Parameter::Temperature);
        assert_eq!(column.get(1), None);
        assert_eq!(column.get(2), Some(12.0));
    }

    #[test]
    fn test_unknown_parameter_writes_nothing() {
        let mut store = store();
        let len = store.grid().len();

        let outcome = store
            .update(&record("w.csv", "03254550", "Wind speed"), series_with(len, 0, 4.0))
            .unwrap();

        assert_eq!(outcome, UpdateOutcome::UnknownParameter("Wind speed".to_string()));
        assert_eq!(store.station().unwrap().station, "03254550");
        for (_, series) in store.columns() {
            assert!(series.is_all_missing());
        }
    }

    #[test]
    fn test_wrong_length_series_rejected() {
        let mut store = store();

        let result = store.update(
            &record("q.csv", "03254550", "Discharge"),
            AlignedSeries::missing(10),
        );

        assert!(matches!(result, Err(AquariusError::ProcessingFailed { .. })));
        assert!(store.station().is_none());
    }
}
