use crate::model::{FetchBatch, FetchRequest, StorageError};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};

/// SQLite-backed cache of fetch batches keyed by (ticker set, start, end).
pub struct SqliteCache {
    conn: Connection,
    ttl: Duration,
}

impl SqliteCache {
    /// Opens the cache database and creates the table if needed.
    pub fn new(db_path: &str, ttl_seconds: u64) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn, ttl_seconds)
    }

    pub fn in_memory(ttl_seconds: u64) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?, ttl_seconds)
    }

    fn with_connection(conn: Connection, ttl_seconds: u64) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS fetch_cache (
                cache_key TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                fetched_at TEXT NOT NULL
            );
            ",
        )?;

        let ttl = i64::try_from(ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Ok(Self { conn, ttl })
    }

    /// Cache key: sorted distinct tickers plus the date range.
    pub fn key_for(req: &FetchRequest) -> String {
        let mut tickers = req.distinct_tickers();
        tickers.sort();
        format!("{}|{}|{}", tickers.join(","), req.start, req.end)
    }

    /// Returns the cached batch if it is younger than the TTL at `now`.
    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Result<Option<FetchBatch>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT payload, fetched_at FROM fetch_cache WHERE cache_key = ?1")?;
        let mut rows = stmt.query(params![key])?;

        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let payload: String = row.get(0)?;
        let fetched_at_str: String = row.get(1)?;
        let fetched_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&fetched_at_str)?.with_timezone(&Utc);

        if now.signed_duration_since(fetched_at) >= self.ttl {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&payload)?))
    }

    /// Stores a batch and drops entries that expired before `now`.
    pub fn put(&self, key: &str, batch: &FetchBatch, now: DateTime<Utc>) -> Result<(), StorageError> {
        let payload = serde_json::to_string(batch)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO fetch_cache (cache_key, payload, fetched_at) VALUES (?1, ?2, ?3)",
            params![key, payload, now.to_rfc3339()],
        )?;
        self.purge_expired(now)?;
        Ok(())
    }

    /// Deletes expired entries, returning how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StorageError> {
        let mut stmt = self.conn.prepare("SELECT cache_key, fetched_at FROM fetch_cache")?;
        let entries: Vec<(String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<_, _>>()?;

        let mut removed = 0;
        for (key, fetched_at_str) in entries {
            let expired = match DateTime::parse_from_rfc3339(&fetched_at_str) {
                Ok(ts) => now.signed_duration_since(ts.with_timezone(&Utc)) >= self.ttl,
                Err(_) => true,
            };
            if expired {
                removed += self
                    .conn
                    .execute("DELETE FROM fetch_cache WHERE cache_key = ?1", params![key])?;
            }
        }
        Ok(removed)
    }

    #[cfg(test)]
    pub fn len(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM fetch_cache", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PriceBar, PriceSeries, TickerFetch};
    use chrono::NaiveDate;

    fn request(tickers: &[&str]) -> FetchRequest {
        FetchRequest {
            tickers: tickers.iter().map(|t| t.to_string()).collect(),
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    fn batch() -> FetchBatch {
        let bars = vec![PriceBar {
            date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            open: 0.1,
            high: 0.30000000000000004,
            low: 0.1,
            close: 123.456789012345,
            volume: 1e9,
        }];
        let mut batch = FetchBatch::new();
        batch.insert("AAPL".into(), TickerFetch::Loaded(PriceSeries::from_bars("AAPL", bars)));
        batch.insert("NOPE".into(), TickerFetch::Missing("not found".into()));
        batch
    }

    #[test]
    fn key_ignores_order_and_duplicates() {
        let a = SqliteCache::key_for(&request(&["MSFT", "AAPL", "MSFT"]));
        let b = SqliteCache::key_for(&request(&["AAPL", "MSFT"]));
        assert_eq!(a, b);
        assert_eq!(a, "AAPL,MSFT|2023-01-01|2024-01-01");
    }

    #[test]
    fn fresh_entry_round_trips_exactly() {
        let cache = SqliteCache::in_memory(3600).unwrap();
        let now = Utc::now();
        cache.put("k", &batch(), now).unwrap();
        let got = cache.get("k", now + Duration::seconds(10)).unwrap();
        assert_eq!(got, Some(batch()));
    }

    #[test]
    fn stale_entry_is_a_miss() {
        let cache = SqliteCache::in_memory(60).unwrap();
        let now = Utc::now();
        cache.put("k", &batch(), now).unwrap();
        assert!(cache.get("k", now + Duration::seconds(61)).unwrap().is_none());
    }

    #[test]
    fn unknown_key_is_a_miss() {
        let cache = SqliteCache::in_memory(60).unwrap();
        assert!(cache.get("missing", Utc::now()).unwrap().is_none());
    }

    #[test]
    fn put_purges_expired_entries() {
        let cache = SqliteCache::in_memory(60).unwrap();
        let now = Utc::now();
        cache.put("old", &batch(), now - Duration::seconds(120)).unwrap();
        cache.put("new", &batch(), now).unwrap();
        assert_eq!(cache.len().unwrap(), 1);
    }
}
