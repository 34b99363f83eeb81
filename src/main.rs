use aquarius_processor::cli::{Args, setup_logging};
use aquarius_processor::{AquariusError, WaterYearProcessor};
use clap::Parser;
use std::process;

fn main() {
    let args = Args::parse();

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        tokio::select! {
            result = run(args) => result,
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(AquariusError::ProcessingInterrupted {
                    reason: "Processing interrupted by user".to_string(),
                }
                .into())
            }
        }
    });

    if let Err(error) = result {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    setup_logging(&args)?;
    let config = args.to_run_config()?;

    let processor = WaterYearProcessor::new(config)?.with_progress(args.show_progress());
    let stats = processor.process().await?;

    if !args.show_progress() {
        return Ok(());
    }
    println!(
        "\nWrote {} rows to {}",
        stats.rows_written,
        stats.output_path.display()
    );
    Ok(())
}
