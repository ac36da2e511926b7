/// Rolling-window primitives over daily series.
///
/// Every function returns `None` instead of a sentinel when the series is too
/// short or a denominator is zero, so callers can keep "undefined" distinct from 0.
pub struct MarketAnalyzer;

impl MarketAnalyzer {
    /// Arithmetic mean; `None` for an empty slice or a non-finite result.
    pub fn mean(data: &[f64]) -> Option<f64> {
        if data.is_empty() {
            return None;
        }
        finite(data.iter().sum::<f64>() / data.len() as f64)
    }

    /// Calculates the moving average of a slice of data with the given window size.
    pub fn moving_average(data: &[f64], window_size: usize) -> Vec<f64> {
        if window_size == 0 || data.len() < window_size {
            return Vec::new();
        }
        data.windows(window_size)
            .map(|window| window.iter().sum::<f64>() / window_size as f64)
            .collect()
    }

    /// Simple moving average of the trailing `window` values.
    pub fn sma_last(data: &[f64], window: usize) -> Option<f64> {
        if window == 0 || data.len() < window {
            return None;
        }
        Self::mean(&data[data.len() - window..])
    }

    /// `num / den`, undefined when the denominator is zero or either side is not finite.
    pub fn ratio(num: f64, den: f64) -> Option<f64> {
        if den == 0.0 || !num.is_finite() || !den.is_finite() {
            return None;
        }
        finite(num / den)
    }

    /// Percent deviation of `value` from `base`.
    pub fn percent_change(value: f64, base: f64) -> Option<f64> {
        Self::ratio(value, base).map(|r| (r - 1.0) * 100.0)
    }

    /// Percent change between the last value and the value `lookback` sessions earlier.
    /// Needs at least `lookback + 1` observations.
    pub fn change_over(data: &[f64], lookback: usize) -> Option<f64> {
        if lookback == 0 || data.len() <= lookback {
            return None;
        }
        let last = data[data.len() - 1];
        let base = data[data.len() - 1 - lookback];
        Self::percent_change(last, base)
    }

    /// Mean of the last `window` values of the `period`-session fractional change series.
    ///
    /// Equivalent to taking `close[i] / close[i - period] - 1` at every point and
    /// averaging the trailing `window` of them.
    pub fn rolling_change_mean(data: &[f64], period: usize, window: usize) -> Option<f64> {
        if period == 0 || window == 0 || data.len() < period + window {
            return None;
        }
        let tail = &data[data.len() - period - window..];
        let changes: Option<Vec<f64>> = tail
            .windows(period + 1)
            .map(|w| Self::ratio(w[period], w[0]).map(|r| r - 1.0))
            .collect();

        Self::moving_average(&changes?, window).last().copied().and_then(finite)
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moving_average_windows() {
        let data = vec![10.0, 11.0, 12.0, 13.0, 14.0];
        assert_eq!(MarketAnalyzer::moving_average(&data, 3), vec![11.0, 12.0, 13.0]);
        assert!(MarketAnalyzer::moving_average(&data, 6).is_empty());
        assert!(MarketAnalyzer::moving_average(&data, 0).is_empty());
    }

    #[test]
    fn sma_last_requires_full_window() {
        let data = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(MarketAnalyzer::sma_last(&data, 2), Some(3.5));
        assert_eq!(MarketAnalyzer::sma_last(&data, 4), Some(2.5));
        assert_eq!(MarketAnalyzer::sma_last(&data, 5), None);
    }

    #[test]
    fn ratio_guards_zero_denominator() {
        assert_eq!(MarketAnalyzer::ratio(1.0, 0.0), None);
        assert_eq!(MarketAnalyzer::ratio(f64::NAN, 1.0), None);
        assert_eq!(MarketAnalyzer::ratio(3.0, 2.0), Some(1.5));
    }

    #[test]
    fn change_over_uses_exact_lookback() {
        let data: Vec<f64> = (1..=11).map(|x| x as f64).collect();
        // last = 11, ten sessions back = 1
        let change = MarketAnalyzer::change_over(&data, 10).unwrap();
        assert!((change - 1000.0).abs() < 1e-9);
        assert_eq!(MarketAnalyzer::change_over(&data, 11), None);
    }

    #[test]
    fn rolling_change_mean_matches_manual_average() {
        let data: Vec<f64> = (1..=40).map(|x| 100.0 + x as f64).collect();
        let n = data.len();
        let expected: f64 = (n - 3..n)
            .map(|i| data[i] / data[i - 5] - 1.0)
            .sum::<f64>()
            / 3.0;
        let got = MarketAnalyzer::rolling_change_mean(&data, 5, 3).unwrap();
        assert!((got - expected).abs() < 1e-12);
    }

    #[test]
    fn rolling_change_mean_needs_period_plus_window() {
        let data = vec![1.0; 31];
        assert_eq!(MarketAnalyzer::rolling_change_mean(&data, 20, 12), None);
        let data = vec![1.0; 32];
        assert_eq!(MarketAnalyzer::rolling_change_mean(&data, 20, 12), Some(0.0));
    }

    #[test]
    fn rolling_change_mean_undefined_on_zero_base() {
        let mut data = vec![1.0; 40];
        data[15] = 0.0;
        assert_eq!(MarketAnalyzer::rolling_change_mean(&data, 20, 12), None);
    }
}
