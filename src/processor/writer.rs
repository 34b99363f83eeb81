//! SD1 output writer
//!
//! Builds the fixed-column output table from a completed merge store and
//! writes it as CSV (the SD1 contract) or Parquet. One row per grid entry;
//! missing values are written as empty cells or nulls.

use crate::config::{CompressionAlgorithm, OutputFormat};
use crate::constants::{OUTPUT_DATETIME_FORMAT, columns};
use crate::error::{AquariusError, Result};
use crate::grid::TimeColumns;
use crate::models::StationInfo;
use crate::store::MergeStore;

use polars::prelude::*;
use std::fs::File;
use std::path::PathBuf;
use tracing::debug;

/// Writer for the merged water-year table
#[derive(Debug, Clone)]
pub struct Sd1Writer {
    output_path: PathBuf,
    format: OutputFormat,
    compression: CompressionAlgorithm,
}

impl Sd1Writer {
    /// Create a new writer
    pub fn new(output_path: PathBuf, format: OutputFormat) -> Self {
        Self {
            output_path,
            format,
            compression: CompressionAlgorithm::Snappy,
        }
    }

    /// Set the compression used for parquet output
    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.compression = compression;
        self
    }

    pub fn output_path(&self) -> &PathBuf {
        &self.output_path
    }

    /// Write the store, returning the number of rows written
    pub async fn write(&self, store: &MergeStore, time_columns: &TimeColumns) -> Result<usize> {
        let station = store
            .station()
            .ok_or_else(|| AquariusError::ProcessingFailed {
                path: self.output_path.clone(),
                reason: "no station has been established for the output".to_string(),
            })?;

        let df = build_frame(store, station, time_columns)?;
        let rows = df.height();

        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let writer = self.clone();
        tokio::task::spawn_blocking(move || writer.write_frame(df))
            .await
            .map_err(|e| AquariusError::ProcessingFailed {
                path: self.output_path.clone(),
                reason: format!("Failed to spawn output write task: {}", e),
            })??;

        debug!(
            "Wrote {} rows to {} as {:?}",
            rows,
            self.output_path.display(),
            self.format
        );

        Ok(rows)
    }

    fn write_frame(&self, mut df: DataFrame) -> Result<()> {
        let mut file = File::create(&self.output_path)?;

        match self.format {
            OutputFormat::Csv => {
                CsvWriter::new(&mut file)
                    .include_header(true)
                    .with_datetime_format(Some(OUTPUT_DATETIME_FORMAT.to_string()))
                    .finish(&mut df)?;
            }
            OutputFormat::Parquet => {
                ParquetWriter::new(&mut file)
                    .with_compression(self.compression.to_polars_compression())
                    .with_statistics(StatisticsOptions::full())
                    .finish(&mut df)?;
            }
        }

        Ok(())
    }
}

/// Assemble the output table in SD1 column order
pub fn build_frame(
    store: &MergeStore,
    station: &StationInfo,
    time_columns: &TimeColumns,
) -> Result<DataFrame> {
    let grid = store.grid();
    let rows = grid.len();

    if time_columns.len() != rows {
        return Err(AquariusError::ProcessingFailed {
            path: PathBuf::new(),
            reason: format!(
                "time columns have {} rows, grid has {}",
                time_columns.len(),
                rows
            ),
        });
    }

    let minutes: Vec<i32> = time_columns.minutes.iter().map(|&m| m as i32).collect();
    let millis: Vec<i64> = grid
        .iter()
        .map(|ts| ts.and_utc().timestamp_millis())
        .collect();

    let mut frame_columns = vec![
        Column::new(columns::STATION_NUM.into(), vec![station.station.as_str(); rows]),
        Column::new(columns::STATION_NAME.into(), vec![station.name.as_str(); rows]),
        Column::new(columns::STATION.into(), vec![station.short_name(); rows]),
        Column::new(columns::DATE.into(), &time_columns.dates),
        Column::new(columns::TIME.into(), &time_columns.times),
        Column::new(columns::MINS.into(), minutes),
        Column::new(columns::DT.into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
        Column::full_null(columns::DT2.into(), rows, &DataType::String),
    ];

    for (parameter, series) in store.columns() {
        frame_columns.push(Column::new(parameter.column_name().into(), series.values()));
    }

    Ok(DataFrame::new(frame_columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CanonicalGrid, WaterYear};
    use crate::models::{AlignedSeries, Parameter, SourceRecord};
    use std::fs;
    use tempfile::TempDir;

    fn populated_store() -> MergeStore {
        let grid = CanonicalGrid::for_water_year(WaterYear::new(2020).unwrap());
        let mut store = MergeStore::new(grid);
        let len = store.grid().len();

        let mut values = vec![None; len];
        values[0] = Some(3.5);
        values[97] = Some(4.25);
        let record = SourceRecord {
            source: PathBuf::from("gh.csv"),
            station: StationInfo {
                station: "03254550".to_string(),
                name: "Licking River at Catawba".to_string(),
            },
            param_label: "Gage height".to_string(),
            parameter: Some(Parameter::GageHeight),
            units: "ft".to_string(),
            readings: Vec::new(),
        };
        store.update(&record, AlignedSeries::new(values)).unwrap();
        store
    }

    #[test]
    fn test_build_frame_columns() {
        let store = populated_store();
        let time_columns = store.grid().time_columns();
        let station = store.station().unwrap().clone();

        let df = build_frame(&store, &station, &time_columns).unwrap();

        assert_eq!(df.height(), store.grid().len());
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "station_num",
                "station_name",
                "station",
                "Date",
                "Time",
                "Mins",
                "DT",
                "DT2",
                "gageheight_ft",
                "discharge_cfs",
                "precip_in",
                "temp_c",
                "do_mgL",
                "pH_su",
                "conductance_umhos",
                "turb_ntu",
                "Velocity",
                "Nitrate",
            ]
        );

        let gage = df.column("gageheight_ft").unwrap();
        assert_eq!(gage.null_count(), df.height() - 2);
        assert_eq!(df.column("discharge_cfs").unwrap().null_count(), df.height());
        assert_eq!(df.column("DT2").unwrap().null_count(), df.height());
    }

    #[test]
    fn test_mismatched_time_columns_rejected() {
        let store = populated_store();
        let station = store.station().unwrap().clone();
        let time_columns = TimeColumns::from_timestamps(&store.grid().timestamps()[..10]);

        assert!(build_frame(&store, &station, &time_columns).is_err());
    }

    #[tokio::test]
    async fn test_write_csv() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("out").join("wy2020.csv");
        let store = populated_store();

        let writer = Sd1Writer::new(output_path.clone(), OutputFormat::Csv);
        assert_eq!(writer.output_path(), &output_path);
        let rows = writer
            .write(&store, &store.grid().time_columns())
            .await
            .unwrap();

        assert_eq!(rows, store.grid().len());
        let text = fs::read_to_string(&output_path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), rows + 1);
        assert_eq!(
            lines[0],
            "station_num,station_name,station,Date,Time,Mins,DT,DT2,gageheight_ft,discharge_cfs,precip_in,temp_c,do_mgL,pH_su,conductance_umhos,turb_ntu,Velocity,Nitrate"
        );
        assert_eq!(
            lines[1],
            "03254550,Licking River at Catawba,Licking,10/01/19,00:00,0,2019-10-01 00:00:00,,3.5,,,,,,,,,"
        );

        let row_98: Vec<&str> = lines[98].split(',').collect();
        assert_eq!(row_98[3], "10/02/19");
        assert_eq!(row_98[4], "00:15");
        assert_eq!(row_98[5], "15");
        assert_eq!(row_98[8].parse::<f64>().unwrap(), 4.25);
    }

    #[tokio::test]
    async fn test_write_parquet() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("wy2020.parquet");
        let store = populated_store();

        let writer = Sd1Writer::new(output_path.clone(), OutputFormat::Parquet)
            .with_compression(CompressionAlgorithm::Zstd);
        let rows = writer
            .write(&store, &store.grid().time_columns())
            .await
            .unwrap();

        let file = File::open(&output_path).unwrap();
        let df = ParquetReader::new(file).finish().unwrap();
        assert_eq!(df.height(), rows);
        assert_eq!(df.width(), 18);
        assert_eq!(
            df.column("gageheight_ft").unwrap().null_count(),
            rows - 2
        );
    }

    #[tokio::test]
    async fn test_write_without_station_fails() {
        let temp_dir = TempDir::new().unwrap();
        let grid = CanonicalGrid::for_water_year(WaterYear::new(2020).unwrap());
        let store = MergeStore::new(grid);

        let writer = Sd1Writer::new(temp_dir.path().join("empty.csv"), OutputFormat::Csv);
        let result = writer.write(&store, &store.grid().time_columns()).await;

        assert!(result.is_err());
        assert!(!temp_dir.path().join("empty.csv").exists());
    }
}
