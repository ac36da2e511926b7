// Yahoo Finance chart API response parsing
use crate::model::{ParserError, PriceBar, PriceSeries};
use chrono::DateTime;
use serde::Deserialize;

pub trait Parser: Send + Sync {
    fn parse(&self, ticker: &str, body: &str) -> Result<PriceSeries, ParserError>;
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Quote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Parses `/v8/finance/chart` responses into a cleaned daily series.
///
/// Rows with a missing close (adjusted or raw) or volume are dropped. The adjusted
/// close is preferred; the raw close is used when the response carries no `adjclose`.
pub struct YahooChartParser;

impl YahooChartParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for YahooChartParser {
    fn default() -> Self {
        Self::new()
    }
}

fn at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

impl Parser for YahooChartParser {
    fn parse(&self, ticker: &str, body: &str) -> Result<PriceSeries, ParserError> {
        let envelope: ChartEnvelope = serde_json::from_str(body)?;

        if let Some(err) = envelope.chart.error {
            return Err(ParserError::Remote {
                code: err.code,
                description: err.description,
            });
        }

        let result = envelope
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| ParserError::MissingField("chart.result".into()))?;

        let offset = result.meta.map(|m| m.gmtoffset).unwrap_or(0);
        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
        let adjclose = result
            .indicators
            .adjclose
            .into_iter()
            .next()
            .map(|a| a.adjclose);

        let mut bars = Vec::with_capacity(result.timestamp.len());
        for (i, &ts) in result.timestamp.iter().enumerate() {
            let Some(date) = ts
                .checked_add(offset)
                .and_then(|local| DateTime::from_timestamp(local, 0))
                .map(|dt| dt.date_naive())
            else {
                continue;
            };
            let close = match &adjclose {
                Some(adj) => at(adj, i),
                None => at(&quote.close, i),
            };
            let (Some(close), Some(volume)) = (close, at(&quote.volume, i)) else {
                continue;
            };

            bars.push(PriceBar {
                date,
                open: at(&quote.open, i).unwrap_or(close),
                high: at(&quote.high, i).unwrap_or(close),
                low: at(&quote.low, i).unwrap_or(close),
                close,
                volume,
            });
        }

        tracing::debug!("Parsed {} bars for {}", bars.len(), ticker);
        Ok(PriceSeries::from_bars(ticker, bars))
    }
}
