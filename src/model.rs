// Core structs: PriceBar, PriceSeries, TickerRecord, Signal and error types
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// One daily bar. `close` is adjusted for splits and dividends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Daily bars for one ticker, ascending by date with no duplicate dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Builds a cleaned series: bars with a non-finite close or volume are dropped,
    /// the rest are sorted by date and a later duplicate date replaces an earlier one.
    pub fn from_bars(ticker: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        let mut by_date: BTreeMap<NaiveDate, PriceBar> = BTreeMap::new();
        for bar in bars {
            if !bar.close.is_finite() || !bar.volume.is_finite() {
                continue;
            }
            by_date.insert(bar.date, bar);
        }

        Self {
            ticker: ticker.into(),
            bars: by_date.into_values().collect(),
        }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }
}

/// Result of fetching a single ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TickerFetch {
    Loaded(PriceSeries),
    Missing(String),
}

/// Per-ticker fetch results for one request, keyed by ticker symbol.
pub type FetchBatch = BTreeMap<String, TickerFetch>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub tickers: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchRequest {
    /// Distinct tickers in first-seen order.
    pub fn distinct_tickers(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.tickers
            .iter()
            .filter(|t| seen.insert(t.as_str()))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Hold,
    Sell,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Buy => "Buy",
            Signal::Hold => "Hold",
            Signal::Sell => "Sell",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "Buy" => Some(Signal::Buy),
            "Hold" => Some(Signal::Hold),
            "Sell" => Some(Signal::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computed output row for one ticker. `None` marks a metric without enough history.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerRecord {
    pub ticker: String,
    pub last_close: f64,
    pub mom260: Option<f64>,
    pub mom_jt: Option<f64>,
    pub relative_strength: Option<f64>,
    pub volume_score: Option<f64>,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub ma130: Option<f64>,
    pub ma200: Option<f64>,
    pub momentum_score: Option<f64>,
    pub signal: Option<Signal>,
}

/// Records sorted by momentum score, highest first.
pub type ResultsTable = Vec<TickerRecord>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    DataUnavailable(String),
    EmptySeries,
    ComputeFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::DataUnavailable(reason) => write!(f, "no data available: {}", reason),
            SkipReason::EmptySeries => f.write_str("price series is empty after cleaning"),
            SkipReason::ComputeFailed(reason) => write!(f, "indicator computation failed: {}", reason),
        }
    }
}

/// Outcome of processing one ticker in a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum TickerOutcome {
    Scored(TickerRecord),
    Skipped { ticker: String, reason: SkipReason },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerWarning {
    pub ticker: String,
    pub reason: SkipReason,
}

impl fmt::Display for TickerWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.ticker, self.reason)
    }
}

#[derive(Debug, Clone)]
pub struct ScreenReport {
    pub table: ResultsTable,
    pub warnings: Vec<TickerWarning>,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    InvalidResponse { status: u16, body: String },
    #[error("parse error: {0}")]
    Parse(#[from] ParserError),
}

impl SourceError {
    /// Network failures, throttling and server errors are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            SourceError::HttpError(_) => true,
            SourceError::InvalidResponse { status, .. } => *status == 429 || *status >= 500,
            SourceError::Parse(_) => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("data source error {code}: {description}")]
    Remote { code: String, description: String },
    #[error("missing field: {0}")]
    MissingField(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("cache payload error: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ScreenerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("nothing to show: no ticker produced indicators")]
    BatchEmpty,
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
