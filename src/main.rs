mod analyzer;
mod cli;
mod config;
mod model;
mod normalizer;
mod parser;
mod pipeline;
mod report;
mod source;
mod storage;
mod utils;

use analyzer::MomentumAnalyzer;
use chrono::Local;
use clap::Parser;
use cli::{Cli, DEFAULT_TICKERS};
use config::{load_config_or_default, AppConfig};
use model::{ScreenReport, ScreenerError};
use normalizer::{parse_ticker_list, read_ticker_csv};
use source::{CachedSource, DataSource, YahooSource};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storage::SqliteCache;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Panic occurred: {:?}", panic_info);
    }));

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Resolves tickers from the upload file, the flag, or the default list.
fn resolve_tickers(cli: &Cli) -> Result<Vec<String>, ScreenerError> {
    match (&cli.file, &cli.tickers) {
        (Some(path), _) => {
            info!("Reading tickers from {}", path.display());
            read_ticker_csv(File::open(path)?)
        }
        (None, Some(list)) => Ok(parse_ticker_list(list)),
        (None, None) => Ok(parse_ticker_list(DEFAULT_TICKERS)),
    }
}

fn parse_date_arg(name: &str, value: &str) -> Result<chrono::NaiveDate, ScreenerError> {
    utils::parse_date(value).ok_or_else(|| {
        ScreenerError::InvalidInput(format!("{} date '{}' is not YYYY-MM-DD", name, value))
    })
}

/// Builds the data source, wrapping it in the SQLite cache unless disabled.
fn build_source(config: &AppConfig, no_cache: bool) -> Result<Box<dyn DataSource>, ScreenerError> {
    let yahoo = YahooSource::new(&config.source)?;

    if no_cache || !config.cache.enabled {
        info!("Fetch cache disabled");
        return Ok(Box::new(yahoo));
    }

    match SqliteCache::new(&config.cache.db_path, config.cache.ttl_seconds) {
        Ok(cache) => Ok(Box::new(CachedSource::new(yahoo, Arc::new(Mutex::new(cache))))),
        Err(e) => {
            warn!("Failed to open cache at {}: {}, continuing without it", config.cache.db_path, e);
            Ok(Box::new(yahoo))
        }
    }
}

/// Renders an exported results file without fetching anything.
fn view_saved(path: &Path) -> Result<(), ScreenerError> {
    let table = report::read_results_csv(File::open(path)?)?;
    if table.is_empty() {
        return Err(ScreenerError::BatchEmpty);
    }
    info!("Loaded {} rows from {}", table.len(), path.display());
    present(&ScreenReport {
        table,
        warnings: Vec::new(),
    });
    Ok(())
}

async fn run(cli: Cli) -> Result<(), ScreenerError> {
    if let Some(path) = &cli.view {
        return view_saved(path);
    }

    let mut config = load_config_or_default(&cli.config)?;
    if let Some(scheme) = cli.scheme {
        config.scheme = scheme;
    }
    let output: PathBuf = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output_path));

    // Validate everything before touching the network
    let tickers = resolve_tickers(&cli)?;
    let start = parse_date_arg("start", &cli.start)?;
    let end = match &cli.end {
        Some(value) => parse_date_arg("end", value)?,
        None => Local::now().date_naive(),
    };
    let request = pipeline::build_request(tickers, start, end)?;

    info!(
        "Screening {} tickers from {} to {} ({:?} scheme)",
        request.tickers.len(),
        start,
        end,
        config.scheme
    );

    let source = build_source(&config, cli.no_cache)?;
    let analyzer = Arc::new(MomentumAnalyzer::new(config.scheme, config.effective_weights()));
    let report = pipeline::run_screen(source.as_ref(), analyzer, &config.effective_thresholds(), &request).await?;

    present(&report);
    report::save_results_csv(&output, &report.table)?;
    Ok(())
}

fn present(report: &ScreenReport) {
    for warning in &report.warnings {
        println!("Warning: {}", warning);
    }
    println!("\nMomentum analysis\n{}", report::render_results(&report.table));
    println!("\nBuy / Hold / Sell\n{}", report::render_signals(&report.table));
}
