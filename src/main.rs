use analytics::AnalyticsEngine;
use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use configuration::{init_tracing, load_config, AnalyticsSettings, LogFormat};
use core_types::PortfolioType;
use serde::Serialize;
use snapshot_store::{BenchmarkStore, SnapshotStore};
use std::path::PathBuf;

mod envelope;
mod render;

use envelope::ApiResponse;

/// The main entry point for the Folio portfolio analytics tool.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file is optional; it only supplies FOLIO__* overrides.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut settings = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(format) = cli.log_format {
        settings.logging.format = format;
    }
    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = init_tracing(&settings.logging).context("Failed to initialize logging")?;

    let engine = AnalyticsEngine::from_settings(&settings.analytics).context("Invalid analytics settings")?;
    tracing::debug!(?settings, "Configuration loaded.");

    // Execute the appropriate command
    match cli.command {
        Commands::Metrics(args) => handle_metrics(args, &engine, &settings.analytics).await,
        Commands::Benchmarks(args) => handle_benchmarks(args, &engine, &settings.analytics).await,
        Commands::Risk(args) => handle_risk(args, &engine).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Risk and performance analytics for recorded portfolio snapshots.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. A missing file falls back to defaults.
    #[arg(long, global = true, default_value = "config/folio.toml")]
    config: Option<PathBuf>,

    /// Overrides the configured log output format.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute return and risk metrics over a trailing window.
    Metrics(MetricsArgs),
    /// Compare the portfolio's return with benchmark indices over a trailing window.
    Benchmarks(BenchmarksArgs),
    /// Evaluate several trailing windows, ending at the newest snapshot unless
    /// --as-of is given, and score the portfolio's overall risk.
    Risk(RiskArgs),
}

/// Options shared by every command.
#[derive(Args)]
struct SelectionArgs {
    /// JSON file holding the recorded portfolio snapshots.
    #[arg(long)]
    snapshots: PathBuf,

    /// Which portfolio to analyze: crypto, stocks or combined.
    #[arg(long, default_value = "combined")]
    portfolio_type: PortfolioType,

    /// End of the analysis window (RFC 3339). Defaults to now, or to the newest
    /// snapshot for `risk`.
    #[arg(long)]
    as_of: Option<DateTime<Utc>>,

    /// Print the `{ success, data }` JSON envelope instead of a table.
    #[arg(long)]
    json: bool,
}

impl SelectionArgs {
    fn as_of(&self) -> DateTime<Utc> {
        self.as_of.unwrap_or_else(Utc::now)
    }
}

#[derive(Args)]
struct MetricsArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Length of the trailing window in days. Defaults to the configured period.
    #[arg(long)]
    period: Option<u32>,
}

#[derive(Args)]
struct BenchmarksArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Length of the trailing window in days. Defaults to the configured period.
    #[arg(long)]
    period: Option<u32>,

    /// JSON file holding the benchmark value series.
    #[arg(long)]
    benchmarks: PathBuf,

    /// Comma-separated benchmark symbols, e.g. "SP500,BTC". Defaults to the configured list.
    #[arg(long, value_delimiter = ',')]
    symbols: Option<Vec<String>>,
}

#[derive(Args)]
struct RiskArgs {
    #[command(flatten)]
    selection: SelectionArgs,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_metrics(args: MetricsArgs, engine: &AnalyticsEngine, defaults: &AnalyticsSettings) -> anyhow::Result<()> {
    let selection = &args.selection;
    let period_days = args.period.unwrap_or(defaults.default_period_days);
    let as_of = selection.as_of();

    let store = SnapshotStore::open(&selection.snapshots)
        .await
        .with_context(|| format!("Failed to open snapshot store {}", selection.snapshots.display()))?;
    let history = store.history(selection.portfolio_type, period_days, as_of);

    let result = engine.compute_metrics(&history, period_days)?;
    emit(&result, selection.json, render::metrics_table)
}

async fn handle_benchmarks(
    args: BenchmarksArgs,
    engine: &AnalyticsEngine,
    defaults: &AnalyticsSettings,
) -> anyhow::Result<()> {
    let selection = &args.selection;
    let period_days = args.period.unwrap_or(defaults.default_period_days);
    let as_of = selection.as_of();
    let symbols = args.symbols.clone().unwrap_or_else(|| defaults.default_benchmarks.clone());

    // Load both stores concurrently.
    let (snapshots, benchmarks) = tokio::try_join!(
        SnapshotStore::open(&selection.snapshots),
        BenchmarkStore::open(&args.benchmarks),
    )
    .context("Failed to open the snapshot or benchmark store")?;

    let history = snapshots.history(selection.portfolio_type, period_days, as_of);
    let resolved = benchmarks.resolve(&symbols, period_days, as_of);

    let comparison = engine.compare_benchmarks(&history, period_days, &symbols, &resolved)?;
    emit(&comparison, selection.json, render::benchmarks_table)
}

async fn handle_risk(args: RiskArgs, engine: &AnalyticsEngine) -> anyhow::Result<()> {
    let selection = &args.selection;
    let store = SnapshotStore::open(&selection.snapshots)
        .await
        .with_context(|| format!("Failed to open snapshot store {}", selection.snapshots.display()))?;

    // Without --as-of, judge the history as of its newest snapshot rather than now.
    let as_of = selection
        .as_of
        .or_else(|| store.latest(selection.portfolio_type))
        .unwrap_or_else(Utc::now);

    let analysis = engine.assess_risk(&store.all(selection.portfolio_type), as_of)?;
    emit(&analysis, selection.json, render::risk_table)
}

/// Prints a result either as the JSON envelope or as a rendered table.
fn emit<T: Serialize>(value: &T, json: bool, table: impl Fn(&T) -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", ApiResponse::ok(value).to_json()?);
    } else {
        println!("{}", table(value));
    }
    Ok(())
}
