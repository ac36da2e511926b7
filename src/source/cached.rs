use crate::model::{FetchBatch, FetchRequest, TickerFetch};
use crate::source::DataSource;
use crate::storage::SqliteCache;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Wraps a source with a TTL cache keyed by (ticker set, start, end).
///
/// Cache errors never fail a fetch; they are logged and the inner source is used.
/// Only batches in which every ticker loaded are stored, so a failed ticker is
/// retried on the next run.
pub struct CachedSource<S> {
    inner: S,
    cache: Arc<Mutex<SqliteCache>>,
}

impl<S: DataSource> CachedSource<S> {
    pub fn new(inner: S, cache: Arc<Mutex<SqliteCache>>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait::async_trait]
impl<S: DataSource> DataSource for CachedSource<S> {
    async fn fetch(&self, req: &FetchRequest) -> FetchBatch {
        let key = SqliteCache::key_for(req);

        let cached = self.cache.lock().await.get(&key, Utc::now());
        match cached {
            Ok(Some(batch)) => {
                info!("Cache hit for {}", key);
                return batch;
            }
            Ok(None) => info!("Cache miss for {}", key),
            Err(e) => warn!("Cache read failed for {}: {}", key, e),
        }

        let batch = self.inner.fetch(req).await;

        if !batch.is_empty() && batch.values().all(|f| matches!(f, TickerFetch::Loaded(_))) {
            if let Err(e) = self.cache.lock().await.put(&key, &batch, Utc::now()) {
                warn!("Cache write failed for {}: {}", key, e);
            }
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PriceBar, PriceSeries};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        failing: Vec<&'static str>,
    }

    #[async_trait::async_trait]
    impl DataSource for CountingSource {
        async fn fetch(&self, req: &FetchRequest) -> FetchBatch {
            self.calls.fetch_add(1, Ordering::SeqCst);
            req.distinct_tickers()
                .into_iter()
                .map(|t| {
                    let fetch = if self.failing.contains(&t.as_str()) {
                        TickerFetch::Missing("offline".into())
                    } else {
                        let bar = PriceBar {
                            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                            open: 1.0,
                            high: 1.0,
                            low: 1.0,
                            close: 1.0 / 3.0,
                            volume: 42.0,
                        };
                        TickerFetch::Loaded(PriceSeries::from_bars(t.clone(), vec![bar]))
                    };
                    (t, fetch)
                })
                .collect()
        }
    }

    fn request(tickers: &[&str]) -> FetchRequest {
        FetchRequest {
            tickers: tickers.iter().map(|t| t.to_string()).collect(),
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        }
    }

    fn cached(failing: Vec<&'static str>) -> CachedSource<CountingSource> {
        let cache = SqliteCache::in_memory(3600).unwrap();
        CachedSource::new(
            CountingSource { calls: AtomicUsize::new(0), failing },
            Arc::new(Mutex::new(cache)),
        )
    }

    #[tokio::test]
    async fn second_identical_request_hits_cache() {
        let src = cached(Vec::new());
        let first = src.fetch(&request(&["AAPL", "MSFT"])).await;
        let second = src.fetch(&request(&["MSFT", "AAPL"])).await;
        assert_eq!(first, second);
        assert_eq!(src.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_range_misses_cache() {
        let src = cached(Vec::new());
        src.fetch(&request(&["AAPL"])).await;
        let mut other = request(&["AAPL"]);
        other.end = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        src.fetch(&other).await;
        assert_eq!(src.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fully_failed_batches_are_not_cached() {
        let src = cached(vec!["AAPL"]);
        src.fetch(&request(&["AAPL"])).await;
        src.fetch(&request(&["AAPL"])).await;
        assert_eq!(src.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn partially_failed_batches_are_refetched() {
        let src = cached(vec!["MSFT"]);
        let first = src.fetch(&request(&["AAPL", "MSFT"])).await;
        assert!(matches!(first.get("MSFT"), Some(TickerFetch::Missing(_))));
        src.fetch(&request(&["AAPL", "MSFT"])).await;
        assert_eq!(src.inner.calls.load(Ordering::SeqCst), 2);
    }
}
