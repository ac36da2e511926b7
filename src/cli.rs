use crate::config::MetricScheme;
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_TICKERS: &str = "AAPL, MSFT, TSLA, NVDA";
pub const DEFAULT_START: &str = "2018-01-01";

#[derive(Debug, Parser)]
#[command(name = "momentum-screener")]
#[command(about = "Rank equity tickers by price momentum with buy/hold/sell signals", long_about = None)]
pub struct Cli {
    /// Comma-separated ticker list
    #[arg(short, long, conflicts_with = "file")]
    pub tickers: Option<String>,

    /// CSV file with a `Ticker` column
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// First day of history (YYYY-MM-DD)
    #[arg(long, default_value = DEFAULT_START)]
    pub start: String,

    /// Last day of history (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub end: Option<String>,

    /// Configuration file
    #[arg(short, long, default_value = "config.json")]
    pub config: String,

    /// Metric definitions to apply, overrides the config file
    #[arg(long, value_enum)]
    pub scheme: Option<MetricScheme>,

    /// Where to write the results CSV, overrides the config file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip the fetch cache
    #[arg(long)]
    pub no_cache: bool,

    /// Show a previously exported results CSV instead of screening
    #[arg(long, conflicts_with_all = ["tickers", "file"])]
    pub view: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let cli = Cli::try_parse_from(["momentum-screener"]).unwrap();
        assert_eq!(cli.start, DEFAULT_START);
        assert!(cli.tickers.is_none());
        assert!(!cli.no_cache);
    }

    #[test]
    fn scheme_flag_parses() {
        let cli = Cli::try_parse_from(["momentum-screener", "--scheme", "weighted", "-t", "aapl"]).unwrap();
        assert_eq!(cli.scheme, Some(MetricScheme::Weighted));
        assert_eq!(cli.tickers.as_deref(), Some("aapl"));
    }

    #[test]
    fn view_conflicts_with_ticker_input() {
        assert!(Cli::try_parse_from(["momentum-screener", "--view", "out.csv", "-t", "AAPL"]).is_err());
        let cli = Cli::try_parse_from(["momentum-screener", "--view", "out.csv"]).unwrap();
        assert_eq!(cli.view, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn tickers_and_file_conflict() {
        assert!(Cli::try_parse_from(["momentum-screener", "-t", "AAPL", "-f", "list.csv"]).is_err());
    }
}
