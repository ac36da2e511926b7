// Analyzer module: rolling primitives, the per-ticker indicator engine,
// signal classification and ranking.

pub mod classifier;
pub mod market_indicators;
pub mod price_analysis;
pub mod ranker;

pub use price_analysis::{Analyzer, MomentumAnalyzer};
