//! Uptrend CLI — scan and backtest commands.
//!
//! Commands:
//! - `scan` — score a ticker universe and export the result tables
//! - `backtest` — walk-forward backtest over historical data, writing the
//!   trade log CSV

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use uptrend_core::data::{DataProvider, PolygonProvider, SyntheticProvider};
use uptrend_runner::backtest::{run_walk_forward, SimplifiedProfile, StdoutBacktestProgress};
use uptrend_runner::config::{run_id, BacktestConfig, ScanConfig};
use uptrend_runner::export::{save_backtest_artifacts, save_scan_artifacts};
use uptrend_runner::scanner::{scan_many, StdoutScanProgress};

#[derive(Parser)]
#[command(name = "uptrend", about = "Uptrend momentum scanner and backtester")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a ticker universe and export early/established uptrend tables.
    Scan {
        /// Comma-separated ticker symbols (e.g. AAPL,MSFT,NVDA).
        #[arg(long)]
        tickers: Option<String>,

        /// File with one ticker per line; # starts a comment.
        #[arg(long)]
        file: Option<PathBuf>,

        /// TOML scan configuration. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Polygon API key (or set POLYGON_API_KEY).
        #[arg(long)]
        api_key: Option<String>,

        /// API requests per minute (omit for unlimited; free tier is 5).
        #[arg(long)]
        rate_limit: Option<u32>,

        /// Use the synthetic data generator instead of the network.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Output directory for artifacts.
        #[arg(long, default_value = "output")]
        out: PathBuf,
    },
    /// Walk-forward backtest; writes the trade log CSV.
    Backtest {
        /// Comma-separated ticker symbols.
        #[arg(long)]
        tickers: Option<String>,

        /// File with one ticker per line; # starts a comment.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Years of history to fetch.
        #[arg(long, default_value_t = 3)]
        years: u32,

        /// Starting capital. Informational only; the core math is
        /// per-signal returns.
        #[arg(long, default_value_t = 100_000.0)]
        capital: f64,

        /// Polygon API key (or set POLYGON_API_KEY).
        #[arg(long)]
        api_key: Option<String>,

        /// API requests per minute (omit for unlimited).
        #[arg(long)]
        rate_limit: Option<u32>,

        /// Use the synthetic data generator instead of the network.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Output directory for artifacts.
        #[arg(long, default_value = "output")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            tickers,
            file,
            config,
            api_key,
            rate_limit,
            synthetic,
            out,
        } => run_scan(tickers, file, config, api_key, rate_limit, synthetic, out),
        Commands::Backtest {
            tickers,
            file,
            years,
            capital,
            api_key,
            rate_limit,
            synthetic,
            out,
        } => run_backtest(tickers, file, years, capital, api_key, rate_limit, synthetic, out),
    }
}

fn resolve_tickers(tickers: Option<String>, file: Option<PathBuf>) -> Result<Vec<String>> {
    let list = match (tickers, file) {
        (Some(_), Some(_)) => bail!("--tickers and --file are mutually exclusive"),
        (Some(csv), None) => csv
            .split(',')
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .collect(),
        (None, Some(path)) => read_ticker_file(&path)?,
        (None, None) => bail!("one of --tickers or --file is required"),
    };
    if list.is_empty() {
        bail!("ticker list is empty");
    }
    Ok(list)
}

fn read_ticker_file(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read ticker file {}", path.display()))?;
    Ok(text
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.to_uppercase())
        .collect())
}

fn build_provider(
    synthetic: bool,
    api_key: Option<String>,
    rate_limit: Option<u32>,
) -> Result<Box<dyn DataProvider>> {
    if synthetic {
        return Ok(Box::new(SyntheticProvider::new()));
    }
    let key = api_key
        .or_else(|| std::env::var("POLYGON_API_KEY").ok())
        .context("API key required: pass --api-key or set POLYGON_API_KEY (or use --synthetic)")?;
    Ok(Box::new(PolygonProvider::new(key, rate_limit)))
}

#[allow(clippy::too_many_arguments)]
fn run_scan(
    tickers: Option<String>,
    file: Option<PathBuf>,
    config: Option<PathBuf>,
    api_key: Option<String>,
    rate_limit: Option<u32>,
    synthetic: bool,
    out: PathBuf,
) -> Result<()> {
    let tickers = resolve_tickers(tickers, file)?;
    let cfg = match config {
        Some(path) => ScanConfig::from_file(&path)?,
        None => ScanConfig::default(),
    };
    let provider = build_provider(synthetic, api_key, rate_limit)?;

    println!("Scanning {} tickers via {}", tickers.len(), provider.name());
    let outcome = scan_many(provider.as_ref(), &tickers, &cfg, &StdoutScanProgress);

    println!();
    println!("Top scores:");
    for record in outcome.records.iter().take(10) {
        println!(
            "  {:<6} {:>5.1}  {}  early={} established={}",
            record.ticker,
            record.score,
            record.tier,
            record.is_early_uptrend,
            record.is_established_uptrend
        );
    }
    println!(
        "Skipped: {} no-data, {} failures",
        outcome.skipped_no_data(),
        outcome.skipped_collaborator()
    );

    let id = run_id(&cfg, &tickers);
    let run_dir = save_scan_artifacts(&outcome, &out, &id)?;
    println!("Artifacts saved to: {}", run_dir.display());

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_backtest(
    tickers: Option<String>,
    file: Option<PathBuf>,
    years: u32,
    capital: f64,
    api_key: Option<String>,
    rate_limit: Option<u32>,
    synthetic: bool,
    out: PathBuf,
) -> Result<()> {
    let tickers = resolve_tickers(tickers, file)?;
    let cfg = BacktestConfig::default();
    cfg.validate()?;
    let provider = build_provider(synthetic, api_key, rate_limit)?;

    println!(
        "Fetching {} years of history for {} tickers via {}",
        years,
        tickers.len(),
        provider.name()
    );

    let mut dataset = BTreeMap::new();
    let mut fetch_failures = 0usize;
    for ticker in &tickers {
        match provider.fetch_daily(ticker, years * 365) {
            Ok(series) => {
                println!("  {ticker}: {} bars", series.len());
                dataset.insert(ticker.clone(), series);
            }
            Err(e) => {
                println!("  {ticker}: {e}");
                fetch_failures += 1;
            }
        }
    }

    if dataset.is_empty() {
        bail!("no historical data available ({fetch_failures} fetch failures)");
    }

    println!("Initial capital: {capital:.0} (informational)");

    let profile = SimplifiedProfile::new(cfg.warmup_bars);
    let report = run_walk_forward(&dataset, &profile, &cfg, &StdoutBacktestProgress)?;

    if fetch_failures > 0 {
        println!("Note: {fetch_failures} tickers skipped on fetch");
    }

    let id = run_id(&cfg, &tickers);
    let run_dir = save_backtest_artifacts(&report, &out, &id)?;
    println!("Trade log saved to: {}", run_dir.join("trades.csv").display());

    Ok(())
}
