use crate::analyzer::Analyzer;
use crate::analyzer::classifier::classify_all;
use crate::analyzer::ranker::rank;
use crate::config::SignalThresholds;
use crate::model::{
    FetchRequest, ScreenReport, ScreenerError, SkipReason, TickerFetch, TickerOutcome,
    TickerRecord, TickerWarning,
};
use crate::source::DataSource;
use chrono::NaiveDate;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

/// Validates the run parameters before anything is fetched.
pub fn build_request(
    tickers: Vec<String>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<FetchRequest, ScreenerError> {
    if tickers.is_empty() {
        return Err(ScreenerError::InvalidInput(
            "please enter at least one ticker".into(),
        ));
    }
    if start > end {
        return Err(ScreenerError::InvalidInput(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }
    Ok(FetchRequest { tickers, start, end })
}

/// Turns one ticker's fetch result into a record or a skip reason.
/// The indicator math runs on the blocking pool.
async fn process_ticker<A: Analyzer + 'static>(
    ticker: String,
    fetch: Option<TickerFetch>,
    analyzer: Arc<A>,
) -> TickerOutcome {
    let series = match fetch {
        Some(TickerFetch::Loaded(series)) => series,
        Some(TickerFetch::Missing(reason)) => {
            return TickerOutcome::Skipped {
                ticker,
                reason: SkipReason::DataUnavailable(reason),
            };
        }
        None => {
            return TickerOutcome::Skipped {
                ticker,
                reason: SkipReason::DataUnavailable("source returned no entry".into()),
            };
        }
    };

    match tokio::task::spawn_blocking(move || analyzer.analyze(&series)).await {
        Ok(Some(record)) => TickerOutcome::Scored(record),
        Ok(None) => TickerOutcome::Skipped {
            ticker,
            reason: SkipReason::EmptySeries,
        },
        Err(e) => TickerOutcome::Skipped {
            ticker,
            reason: SkipReason::ComputeFailed(e.to_string()),
        },
    }
}

/// Splits outcomes into records and warnings, preserving input order.
pub fn collect_outcomes(outcomes: Vec<TickerOutcome>) -> (Vec<TickerRecord>, Vec<TickerWarning>) {
    let mut records = Vec::new();
    let mut warnings = Vec::new();

    for outcome in outcomes {
        match outcome {
            TickerOutcome::Scored(record) => records.push(record),
            TickerOutcome::Skipped { ticker, reason } => {
                warn!("Excluding {}: {}", ticker, reason);
                warnings.push(TickerWarning { ticker, reason });
            }
        }
    }
    (records, warnings)
}

/// Fetches, scores, classifies and ranks every requested ticker.
///
/// Per-ticker failures end up as warnings in the report. The run only fails
/// when no ticker produced a record.
pub async fn run_screen<S, A>(
    source: &S,
    analyzer: Arc<A>,
    thresholds: &SignalThresholds,
    req: &FetchRequest,
) -> Result<ScreenReport, ScreenerError>
where
    S: DataSource + ?Sized,
    A: Analyzer + 'static,
{
    let batch = source.fetch(req).await;

    let tasks = req.tickers.iter().map(|ticker| {
        process_ticker(ticker.clone(), batch.get(ticker).cloned(), analyzer.clone())
    });
    let outcomes = join_all(tasks).await;

    let (mut records, warnings) = collect_outcomes(outcomes);
    if records.is_empty() {
        return Err(ScreenerError::BatchEmpty);
    }

    classify_all(&mut records, thresholds);
    let table = rank(records);

    info!(
        "Screened {} tickers: {} ranked, {} excluded",
        req.tickers.len(),
        table.len(),
        warnings.len()
    );
    Ok(ScreenReport { table, warnings })
}
