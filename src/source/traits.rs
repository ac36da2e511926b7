use crate::model::{FetchBatch, FetchRequest};

/// Supplies daily bars for a set of tickers.
///
/// Implementations must tolerate partial failure: every distinct requested ticker
/// gets an entry, either `Loaded` or `Missing` with a reason.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, req: &FetchRequest) -> FetchBatch;
}
