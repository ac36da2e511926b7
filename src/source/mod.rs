pub mod cached;
pub mod fetcher;
pub mod traits;

pub use cached::CachedSource;
pub use fetcher::YahooSource;
pub use traits::DataSource;
