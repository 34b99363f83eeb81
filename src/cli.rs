//! Command-line interface components.

use crate::config::{CompressionAlgorithm, OutputFormat, RunConfig};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "aquarius")]
#[command(about = "Merge AQUARIUS sensor exports into one 15-minute water-year table")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Water year to build, named for the year it ends in (e.g. 2020 = Oct 2019 - Sep 2020)
    #[arg(value_name = "WATER_YEAR", allow_negative_numbers = true)]
    pub water_year: i32,

    /// Directory containing the AQUARIUS export files for one station
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Output file (format follows the extension unless --format is given)
    #[arg(value_name = "OUTPUT_PATH")]
    pub output_path: PathBuf,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Parquet compression algorithm (snappy, zstd, lz4, none)
    #[arg(long, default_value = "snappy")]
    pub compression: String,

    /// Glob pattern selecting export files
    #[arg(long, default_value = crate::constants::DEFAULT_FILE_PATTERN)]
    pub pattern: String,

    /// Also search subdirectories of INPUT_DIR
    #[arg(short, long)]
    pub recursive: bool,

    /// Maximum files read concurrently (defaults to the CPU count, capped at 8)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only report errors; no progress bar or summary
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Output format selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Csv,
    Parquet,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Parquet => OutputFormat::Parquet,
        }
    }
}

impl Args {
    /// Tracing level implied by the verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    /// Build the run configuration from the parsed arguments
    pub fn to_run_config(&self) -> Result<RunConfig> {
        let mut config = RunConfig::new(
            self.water_year,
            self.input_dir.clone(),
            self.output_path.clone(),
        )
        .with_file_pattern(self.pattern.clone())
        .with_compression(CompressionAlgorithm::parse(&self.compression)?);

        if let Some(format) = self.format {
            config = config.with_output_format(format.into());
        }
        if self.recursive {
            config = config.with_recursive();
        }
        if let Some(jobs) = self.jobs {
            config = config.with_max_concurrent_files(jobs);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Install the tracing subscriber; logs go to stderr so stdout stays clean
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("aquarius_processor={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}
