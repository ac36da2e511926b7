use crate::config::SourceConfig;
use crate::model::{FetchBatch, FetchRequest, PriceSeries, SourceError, TickerFetch};
use crate::parser::{Parser, YahooChartParser};
use crate::source::DataSource;
use chrono::{Days, NaiveDate};
use futures::future::join_all;
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

const MAX_BACKOFF: Duration = Duration::from_secs(10);

pub struct YahooSource {
    client: Client,
    base_url: String,
    max_retries: u32,
    parser: YahooChartParser,
}

impl YahooSource {
    pub fn new(cfg: &SourceConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(cfg.user_agent.as_str())
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            max_retries: cfg.max_retries,
            parser: YahooChartParser::new(),
        })
    }

    /// Daily chart URL. The end date is inclusive, so `period2` is midnight of the following day.
    fn build_url(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> String {
        let period1 = start.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp()).unwrap_or(0);
        let period2 = end
            .checked_add_days(Days::new(1))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(period1);
        format!(
            "{}/{}?period1={}&period2={}&interval=1d&events=div%2Csplits",
            self.base_url, ticker, period1, period2
        )
    }

    async fn fetch_once(&self, url: &str) -> Result<String, SourceError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // Yahoo answers unknown symbols with 404 and a JSON error payload
        if status.is_success() || status.as_u16() == 404 {
            return Ok(body);
        }
        Err(SourceError::InvalidResponse {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        })
    }

    async fn fetch_ticker(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, SourceError> {
        let url = self.build_url(ticker, start, end);
        let mut attempt = 0;

        loop {
            debug!("GET {} (attempt {})", url, attempt + 1);
            match self.fetch_once(&url).await {
                Ok(body) => return Ok(self.parser.parse(ticker, &body)?),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = Duration::from_secs_f64(0.5 * 2f64.powi(attempt as i32 - 1) + rand::random::<f64>() * 0.5)
                        .min(MAX_BACKOFF);
                    warn!(
                        "Fetch {} failed ({}), retry {}/{} in {:.1}s",
                        ticker,
                        e,
                        attempt,
                        self.max_retries,
                        delay.as_secs_f64()
                    );
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait::async_trait]
impl DataSource for YahooSource {
    async fn fetch(&self, req: &FetchRequest) -> FetchBatch {
        let tickers = req.distinct_tickers();
        info!("Fetching {} tickers from {} to {}", tickers.len(), req.start, req.end);

        let tasks = tickers
            .iter()
            .map(|ticker| self.fetch_ticker(ticker, req.start, req.end));
        let results = join_all(tasks).await;

        tickers
            .into_iter()
            .zip(results)
            .map(|(ticker, result)| {
                let fetch = match result {
                    Ok(series) => {
                        if series.is_empty() {
                            warn!("No bars for {} in {}..{}", ticker, req.start, req.end);
                        } else if let (Some(first), Some(last)) = (series.bars().first(), series.bars().last()) {
                            debug!("Loaded {} bars for {} ({}..{})", series.len(), ticker, first.date, last.date);
                        }
                        TickerFetch::Loaded(series)
                    }
                    Err(e) => {
                        warn!("Fetch failed for {}: {}", ticker, e);
                        TickerFetch::Missing(e.to_string())
                    }
                };
                (ticker, fetch)
            })
            .collect()
    }
}
