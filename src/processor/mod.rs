//! Water-year processing pipeline.
//!
//! Orchestrates discovery, ordered loading, merging and export of one
//! station's AQUARIUS exports into a single SD1 table.

pub mod discovery;
pub mod streaming;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::{discovery::FileDiscovery, streaming::StreamingLoader, writer::Sd1Writer};

use crate::config::RunConfig;
use crate::error::{AquariusError, Result};
use crate::grid::{CanonicalGrid, WaterYear};
use crate::models::{FileEvent, ProcessingStats, describe_summary};
use crate::store::{MergeStore, UpdateOutcome};

use colored::*;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Main processor for one water year of exports
#[derive(Debug)]
pub struct WaterYearProcessor {
    config: RunConfig,
    water_year: WaterYear,
    show_progress: bool,
}

impl WaterYearProcessor {
    /// Create a processor; an invalid water year or configuration is rejected here
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        let water_year = WaterYear::new(config.water_year)?;

        Ok(Self {
            config,
            water_year,
            show_progress: false,
        })
    }

    /// Draw a progress bar and print the run summary to stdout
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Main processing entry point
    pub async fn process(&self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        self.print_banner();

        // Step 1: Build the canonical grid
        let grid = CanonicalGrid::for_water_year(self.water_year);
        let time_columns = grid.time_columns();
        debug!(
            "Canonical grid for {}: {} entries from {} to {}",
            self.water_year,
            grid.len(),
            self.water_year.start(),
            self.water_year.end()
        );

        // Step 2: Discover export files
        let files = FileDiscovery::new(self.config.input_dir.clone(), &self.config.file_pattern)
            .recursive(self.config.recursive)
            .exclude(self.config.output_path.clone())
            .discover_files()
            .await?;
        info!(
            "Found {} export files in {}",
            files.len(),
            self.config.input_dir.display()
        );

        let mut stats = ProcessingStats {
            files_discovered: files.len(),
            output_path: self.config.output_path.clone(),
            ..Default::default()
        };

        // Step 3: Load files in order and merge them with a single writer
        let grid = Arc::new(grid);
        let mut store = MergeStore::new(grid.as_ref().clone());
        let loader = StreamingLoader::new(Arc::clone(&grid), self.config.max_concurrent_files);
        let progress_bar = self.progress_bar(files.len());

        let mut loaded_files = std::pin::pin!(loader.load_files(files));
        while let Some(loaded) = loaded_files.next().await {
            if let Some(file_name) = loaded.path.file_name() {
                progress_bar.set_message(format!("Merging: {}", file_name.to_string_lossy()));
            }

            let event = match loaded.result {
                Ok(aligned) => match store.update(&aligned.record, aligned.series) {
                    Ok(UpdateOutcome::Filled(parameter)) => {
                        info!(
                            "{} processed from {}: {}",
                            parameter,
                            loaded.path.display(),
                            describe_summary(aligned.report.summary.as_ref())
                        );
                        FileEvent::Processed {
                            path: loaded.path,
                            parameter,
                            summary: aligned.report.summary,
                            replaced: None,
                        }
                    }
                    Ok(UpdateOutcome::Replaced {
                        parameter,
                        previous,
                    }) => {
                        info!(
                            "{} processed from {}: {}",
                            parameter,
                            loaded.path.display(),
                            describe_summary(aligned.report.summary.as_ref())
                        );
                        FileEvent::Processed {
                            path: loaded.path,
                            parameter,
                            summary: aligned.report.summary,
                            replaced: Some(previous),
                        }
                    }
                    Ok(UpdateOutcome::UnknownParameter(label)) => {
                        warn!(
                            "Skipping {}: parameter '{}' has no output column",
                            loaded.path.display(),
                            label
                        );
                        FileEvent::UnknownParameter {
                            path: loaded.path,
                            label,
                        }
                    }
                    Err(AquariusError::StationMismatch {
                        path,
                        expected,
                        found,
                    }) => {
                        warn!(
                            "Rejecting {}: station {} does not match {}",
                            path.display(),
                            found,
                            expected
                        );
                        FileEvent::StationRejected {
                            path,
                            expected,
                            found,
                        }
                    }
                    Err(e) => skipped_event(loaded.path, e)?,
                },
                Err(e) => skipped_event(loaded.path, e)?,
            };

            match &event {
                FileEvent::Processed { .. } | FileEvent::UnknownParameter { .. } => {
                    stats.files_processed += 1
                }
                FileEvent::Skipped { .. } => stats.files_skipped += 1,
                FileEvent::StationRejected { .. } => stats.files_rejected += 1,
            }
            stats.events.push(event);
            progress_bar.inc(1);
        }
        progress_bar.finish_and_clear();

        if store.station().is_none() {
            error!(
                "No usable AQUARIUS export among {} files in {}",
                stats.files_discovered,
                self.config.input_dir.display()
            );
            return Err(AquariusError::NoStationData {
                path: self.config.input_dir.clone(),
            });
        }

        // Step 4: Export
        let writer = Sd1Writer::new(self.config.output_path.clone(), self.config.output_format)
            .with_compression(self.config.compression);
        stats.rows_written = writer.write(&store, &time_columns).await?;

        stats.column_summaries = store
            .columns()
            .map(|(parameter, series)| (parameter, series.summary()))
            .collect();
        stats.processing_time_ms = start_time.elapsed().as_millis();

        self.print_summary(&stats);
        Ok(stats)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }

    fn print_banner(&self) {
        if !self.show_progress {
            return;
        }

        println!(
            "{}",
            format!("Building {} time series", self.water_year)
                .bright_green()
                .bold()
        );
        println!(
            "  {} {}",
            "Input:".bright_cyan(),
            self.config.input_dir.display()
        );
        println!(
            "  {} {}",
            "Output:".bright_cyan(),
            self.config.output_path.display()
        );
    }

    fn print_summary(&self, stats: &ProcessingStats) {
        if !self.show_progress {
            return;
        }

        println!("\n{}", "Parameter Summary".bright_green().bold());
        for (parameter, summary) in &stats.column_summaries {
            let text = describe_summary(summary.as_ref());
            let text = if summary.is_some() {
                text.bright_white()
            } else {
                text.bright_black()
            };
            println!("  {:<42} {}", parameter.description().bright_cyan(), text);
        }

        let warnings: Vec<_> = stats.warnings().collect();
        if !warnings.is_empty() {
            println!("\n{}", "Warnings".bright_yellow().bold());
            for event in warnings {
                println!("  {}", describe_warning(event).yellow());
            }
        }

        println!("\n{}", "Processing Summary".bright_green().bold());
        println!(
            "  {} {}ms",
            "Time elapsed:".bright_cyan(),
            stats.processing_time_ms.to_string().bright_white()
        );
        println!(
            "  {} {}",
            "Files processed:".bright_cyan(),
            stats.files_processed.to_string().bright_white()
        );
        if stats.files_skipped > 0 {
            println!(
                "  {} {}",
                "Files skipped:".bright_red(),
                stats.files_skipped.to_string().bright_red().bold()
            );
        }
        if stats.files_rejected > 0 {
            println!(
                "  {} {}",
                "Files rejected:".bright_red(),
                stats.files_rejected.to_string().bright_red().bold()
            );
        }
        println!(
            "  {} {}",
            "Rows written:".bright_cyan(),
            stats.rows_written.to_string().bright_white().bold()
        );
    }
}

/// Turn a file-scoped error into a skip event; anything else ends the run
fn skipped_event(path: std::path::PathBuf, error: AquariusError) -> Result<FileEvent> {
    if !error.is_file_scoped() {
        error!("Aborting run at {}: {}", path.display(), error);
        return Err(error);
    }

    warn!("Skipping {}: {}", path.display(), error);
    Ok(FileEvent::Skipped {
        path,
        reason: error.to_string(),
    })
}

/// One-line description of a warning event
pub fn describe_warning(event: &FileEvent) -> String {
    match event {
        FileEvent::Processed {
            path,
            parameter,
            replaced: Some(previous),
            ..
        } => format!(
            "{}: {} replaced values loaded from {}",
            path.display(),
            parameter,
            previous.display()
        ),
        FileEvent::Processed { path, parameter, .. } => {
            format!("{}: {} processed", path.display(), parameter)
        }
        FileEvent::UnknownParameter { path, label } => {
            format!("{}: unrecognized parameter '{}'", path.display(), label)
        }
        FileEvent::Skipped { path, reason } => format!("{}: skipped - {}", path.display(), reason),
        FileEvent::StationRejected {
            path,
            expected,
            found,
        } => format!(
            "{}: data file not from the same station (expected {}, found {})",
            path.display(),
            expected,
            found
        ),
    }
}
