//! corrlab CLI — Bitcoin correlation dashboard data pipeline.
//!
//! Running with no subcommand fetches all symbols and regenerates
//! `data.json` in one go; `fetch` and `aggregate` run a single stage.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use corrlab_core::data::{fetch_symbols, CsvStore, StdoutProgress, YahooProvider};
use corrlab_core::{aggregate_to_file, Dashboard, PipelineConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "corrlab",
    about = "corrlab — fetch market data and build the Bitcoin correlation dashboard JSON"
)]
struct Cli {
    /// Path to a TOML pipeline config. Defaults to the built-in
    /// BTC/SPY/QQQ/IGV/GLD/DXY set.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding one CSV per symbol. Overrides the config.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output JSON path. Overrides the config.
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download daily bars for every configured symbol into the data dir.
    Fetch,
    /// Rebuild data.json from whatever CSVs exist.
    Aggregate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(output) = cli.output {
        config.output_path = output;
    }
    config.validate()?;

    match cli.command {
        Some(Commands::Fetch) => run_fetch(&config),
        Some(Commands::Aggregate) => run_aggregate(&config),
        None => {
            run_fetch(&config)?;
            println!();
            run_aggregate(&config)
        }
    }
}

fn run_fetch(config: &PipelineConfig) -> Result<()> {
    let provider = YahooProvider::new();
    let store = CsvStore::new(&config.data_dir);
    let today = chrono::Local::now().date_naive();

    let summary = fetch_symbols(&provider, &store, config, today, &StdoutProgress);

    // Partial success is fine; aggregation decides what it can build.
    for (symbol, err) in &summary.errors {
        eprintln!("Error for {symbol}: {err}");
    }
    Ok(())
}

fn run_aggregate(config: &PipelineConfig) -> Result<()> {
    let (dashboard, size) = aggregate_to_file(config)
        .map_err(|e| anyhow!("aggregation failed, no artifact written: {e}"))?;

    print_report(config, &dashboard, size);
    Ok(())
}

fn print_report(config: &PipelineConfig, dashboard: &Dashboard, size: u64) {
    println!(
        "{} generated ({:.1} KB)",
        config.output_path.display(),
        size as f64 / 1024.0
    );
    println!(
        "  Candles: {}, Last: {}",
        dashboard.candles.len(),
        dashboard.last_updated
    );
    if let Some(latest) = dashboard.primary_latest {
        println!("  {} Latest: {latest:.2}", config.primary);
    }
}
