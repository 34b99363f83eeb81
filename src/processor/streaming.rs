//! Ordered loading of export files
//!
//! Reads, parses and aligns files with bounded concurrency while yielding
//! results strictly in input order, so the single consumer merging them
//! sees the same sequence as a sequential run.

use crate::align::{AlignmentReport, align};
use crate::error::{AquariusError, Result};
use crate::grid::CanonicalGrid;
use crate::models::{AlignedSeries, SourceRecord};
use crate::parser::read_source_file;

use futures::stream::{self, Stream, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task;
use tracing::debug;

/// A parsed record together with its alignment
#[derive(Debug)]
pub struct AlignedRecord {
    pub record: SourceRecord,
    pub series: AlignedSeries,
    pub report: AlignmentReport,
}

/// Outcome of loading one file
#[derive(Debug)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub result: Result<AlignedRecord>,
}

/// Streaming loader for export files
#[derive(Debug, Clone)]
pub struct StreamingLoader {
    grid: Arc<CanonicalGrid>,
    max_concurrent_files: usize,
}

impl StreamingLoader {
    /// Create a new loader aligning onto `grid`
    pub fn new(grid: Arc<CanonicalGrid>, max_concurrent_files: usize) -> Self {
        Self {
            grid,
            max_concurrent_files: max_concurrent_files.max(1),
        }
    }

    /// Load `files`, yielding one result per file in the given order
    pub fn load_files(&self, files: Vec<PathBuf>) -> impl Stream<Item = LoadedFile> + use<> {
        let loader = self.clone();
        debug!(
            "Loading {} files with up to {} in flight",
            files.len(),
            loader.max_concurrent_files
        );

        let limit = loader.max_concurrent_files;
        stream::iter(files)
            .map(move |path| {
                let loader = loader.clone();
                async move {
                    let result = loader.load_file(path.clone()).await;
                    LoadedFile { path, result }
                }
            })
            .buffered(limit)
    }

    /// Read, parse and align a single file
    pub async fn load_file(&self, path: PathBuf) -> Result<AlignedRecord> {
        let record = read_source_file(&path).await?;
        let grid = Arc::clone(&self.grid);

        task::spawn_blocking(move || {
            let (series, report) = align(&grid, &record);
            AlignedRecord {
                record,
                series,
                report,
            }
        })
        .await
        .map_err(|e| AquariusError::ProcessingFailed {
            path,
            reason: format!("Alignment task failed: {}", e),
        })
    }
}
