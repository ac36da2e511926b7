use crate::analyzer::market_indicators::MarketAnalyzer;
use crate::config::{MetricScheme, ScoreWeights};
use crate::model::{PriceSeries, TickerRecord};

/// Sessions in one trading year.
pub const LONG_LOOKBACK: usize = 260;
/// Fixed-window lookback for `mom_jt` under the weighted scheme.
pub const MEDIUM_LOOKBACK: usize = 120;
/// Return period and averaging window for `mom_jt` under the classic scheme.
pub const ROLLING_RETURN_PERIOD: usize = 20;
pub const ROLLING_RETURN_WINDOW: usize = 12;
pub const VOLUME_WINDOW: usize = 20;

/// Trait defining the interface for a per-ticker indicator engine.
pub trait Analyzer: Send + Sync {
    /// Returns `None` when the series has no usable bars.
    fn analyze(&self, series: &PriceSeries) -> Option<TickerRecord>;
}

/// Computes moving averages, momentum returns, relative strength and volume
/// ratio for one series and folds them into a weighted momentum score.
#[derive(Debug, Clone, Copy)]
pub struct MomentumAnalyzer {
    scheme: MetricScheme,
    weights: ScoreWeights,
}

impl MomentumAnalyzer {
    pub fn new(scheme: MetricScheme, weights: ScoreWeights) -> Self {
        Self { scheme, weights }
    }

    fn mom_jt(&self, closes: &[f64]) -> Option<f64> {
        match self.scheme {
            MetricScheme::Classic => {
                if closes.len() <= LONG_LOOKBACK {
                    return None;
                }
                MarketAnalyzer::rolling_change_mean(closes, ROLLING_RETURN_PERIOD, ROLLING_RETURN_WINDOW)
                    .map(|m| m * 100.0)
            }
            MetricScheme::Weighted => MarketAnalyzer::change_over(closes, MEDIUM_LOOKBACK),
        }
    }

    fn relative_strength(&self, closes: &[f64], last_close: f64, ma130: Option<f64>) -> Option<f64> {
        let baseline = match self.scheme {
            MetricScheme::Classic => MarketAnalyzer::mean(closes)?,
            MetricScheme::Weighted => ma130?,
        };
        MarketAnalyzer::percent_change(last_close, baseline)
    }

    fn volume_score(volumes: &[f64]) -> Option<f64> {
        let recent = MarketAnalyzer::sma_last(volumes, VOLUME_WINDOW)?;
        let overall = MarketAnalyzer::mean(volumes)?;
        MarketAnalyzer::ratio(recent, overall)
    }

    /// Weighted sum of the components on a common scale. Undefined if any input is.
    pub fn composite_score(
        weights: &ScoreWeights,
        mom260: Option<f64>,
        mom_jt: Option<f64>,
        relative_strength: Option<f64>,
        volume_score: Option<f64>,
    ) -> Option<f64> {
        let score = weights.mom260 * mom260? / 100.0
            + weights.mom_jt * mom_jt? / 100.0
            + weights.relative_strength * relative_strength? / 100.0
            + weights.volume * volume_score?;
        score.is_finite().then_some(score)
    }
}

impl Analyzer for MomentumAnalyzer {
    fn analyze(&self, series: &PriceSeries) -> Option<TickerRecord> {
        let closes = series.closes();
        let volumes = series.volumes();
        let last_close = *closes.last()?;

        let ma20 = MarketAnalyzer::sma_last(&closes, 20);
        let ma50 = MarketAnalyzer::sma_last(&closes, 50);
        let ma130 = MarketAnalyzer::sma_last(&closes, 130);
        let ma200 = MarketAnalyzer::sma_last(&closes, 200);

        let mom260 = MarketAnalyzer::change_over(&closes, LONG_LOOKBACK);
        let mom_jt = self.mom_jt(&closes);
        let relative_strength = self.relative_strength(&closes, last_close, ma130);
        let volume_score = Self::volume_score(&volumes);
        let momentum_score =
            Self::composite_score(&self.weights, mom260, mom_jt, relative_strength, volume_score);

        tracing::debug!(
            ticker = %series.ticker,
            bars = closes.len(),
            ?mom260,
            ?mom_jt,
            ?relative_strength,
            ?volume_score,
            ?momentum_score,
            "indicators computed"
        );

        Some(TickerRecord {
            ticker: series.ticker.clone(),
            last_close,
            mom260,
            mom_jt,
            relative_strength,
            volume_score,
            ma20,
            ma50,
            ma130,
            ma200,
            momentum_score,
            signal: None,
        })
    }
}
