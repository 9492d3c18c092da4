//! Flatpipe - flat-file ETL pipeline

use anyhow::Result;
use clap::{Parser, Subcommand};
use flatpipe_common::logging::{init_logging, LogConfig, LogLevel};
use flatpipe_etl::config::PipelineConfig;
use flatpipe_etl::extract::extract_dir;
use flatpipe_etl::load::write_csv;
use flatpipe_etl::pipeline::Pipeline;
use flatpipe_etl::transform::convert_units;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "flatpipe")]
#[command(author, version, about = "Flat-file ETL pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline: download, extract, transform, load,
    /// upload, append
    Run,

    /// Upload every file in the source directory to the bucket
    SyncUp,

    /// Download every object in the bucket into the working directory
    SyncDown,

    /// Extract and transform local files only, writing the output CSV
    Extract {
        /// Directory to extract instead of the configured working
        /// directory
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Environment configures logging; the verbose flag overrides the level
    let mut log_config = LogConfig::from_env()?;
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }

    let _log_guard = init_logging(&log_config)?;

    let config = PipelineConfig::load()?;

    match cli.command {
        Command::Run => {
            let stats = Pipeline::new(config).run().await?;
            info!(
                "Run finished: {} files downloaded ({} failed), {} rows extracted, {:?} rows appended",
                stats.files_downloaded,
                stats.download_failures,
                stats.rows_extracted,
                stats.rows_appended
            );
        },
        Command::SyncUp => {
            let report = Pipeline::new(config).sync_up().await?;
            info!(
                "Sync up finished: {} uploaded, {} failed",
                report.succeeded(),
                report.failed()
            );
        },
        Command::SyncDown => {
            let report = Pipeline::new(config).sync_down().await?;
            info!(
                "Sync down finished: {} downloaded, {} failed",
                report.succeeded(),
                report.failed()
            );
        },
        Command::Extract { input } => {
            let dir = input.unwrap_or_else(|| config.work_dir.clone());
            let records = convert_units(extract_dir(&dir)?)?;
            let path = write_csv(&records, &config.output_file)?;
            info!("Wrote {} rows to {}", records.len(), path.display());
        },
    }

    Ok(())
}
