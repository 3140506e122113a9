//! `run-scorer` - draw a comparison chart from a JSON report manifest.
//!
//! ```text
//! run-scorer report.json --output-dir plots --export-csv plots/report.csv
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use run_scorer::ReportConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Group, average and plot training-run scores.
#[derive(Debug, Parser)]
#[command(name = "run-scorer", version, about)]
struct Cli {
    /// Report manifest (JSON)
    manifest: PathBuf,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Directory for the PNG (overrides plot.file_dir)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Also write the merged score table as CSV
    #[arg(long)]
    export_csv: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = ReportConfig::load(&cli.manifest)
        .with_context(|| format!("failed to load manifest {}", cli.manifest.display()))?;
    if let Some(dir) = cli.output_dir {
        config.plot.file_dir = dir;
    }
    if cli.export_csv.is_some() {
        config.export_csv = cli.export_csv;
    }

    let report = config.run().context("failed to build report")?;

    info!(
        groups = report.scorer.averages().len(),
        width = report.chart.width,
        height = report.chart.height,
        "report complete"
    );
    if let Some(path) = &report.chart.path {
        println!("chart: {}", path.display());
    }
    if let Some(path) = &report.csv_path {
        println!("table: {}", path.display());
    }
    Ok(())
}
