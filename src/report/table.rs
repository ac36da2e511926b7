use crate::model::{ResultsTable, TickerRecord};
use crate::utils::format_2dp;
use tabled::{Table, Tabled};

const MISSING: &str = "-";

#[derive(Debug, Tabled)]
pub struct ResultRow {
    #[tabled(rename = "Ticker")]
    pub ticker: String,
    #[tabled(rename = "Price")]
    pub price: String,
    #[tabled(rename = "MOM260 (%)")]
    pub mom260: String,
    #[tabled(rename = "MOMJT (%)")]
    pub mom_jt: String,
    #[tabled(rename = "Rel. Strength (%)")]
    pub relative_strength: String,
    #[tabled(rename = "Volume Score")]
    pub volume_score: String,
    #[tabled(rename = "MA20")]
    pub ma20: String,
    #[tabled(rename = "MA50")]
    pub ma50: String,
    #[tabled(rename = "MA130")]
    pub ma130: String,
    #[tabled(rename = "MA200")]
    pub ma200: String,
    #[tabled(rename = "Momentum-Score")]
    pub score: String,
}

impl From<&TickerRecord> for ResultRow {
    fn from(r: &TickerRecord) -> Self {
        Self {
            ticker: r.ticker.clone(),
            price: format_2dp(Some(r.last_close), MISSING),
            mom260: format_2dp(r.mom260, MISSING),
            mom_jt: format_2dp(r.mom_jt, MISSING),
            relative_strength: format_2dp(r.relative_strength, MISSING),
            volume_score: format_2dp(r.volume_score, MISSING),
            ma20: format_2dp(r.ma20, MISSING),
            ma50: format_2dp(r.ma50, MISSING),
            ma130: format_2dp(r.ma130, MISSING),
            ma200: format_2dp(r.ma200, MISSING),
            score: format_2dp(r.momentum_score, MISSING),
        }
    }
}

#[derive(Debug, Tabled)]
pub struct SignalRow {
    #[tabled(rename = "Ticker")]
    pub ticker: String,
    #[tabled(rename = "Momentum-Score")]
    pub score: String,
    #[tabled(rename = "MA50")]
    pub ma50: String,
    #[tabled(rename = "MA200")]
    pub ma200: String,
    #[tabled(rename = "Signal")]
    pub signal: String,
}

impl From<&TickerRecord> for SignalRow {
    fn from(r: &TickerRecord) -> Self {
        Self {
            ticker: r.ticker.clone(),
            score: format_2dp(r.momentum_score, MISSING),
            ma50: format_2dp(r.ma50, MISSING),
            ma200: format_2dp(r.ma200, MISSING),
            signal: r.signal.map(|s| s.to_string()).unwrap_or_else(|| MISSING.to_string()),
        }
    }
}

/// Momentum analysis table with every indicator column.
pub fn render_results(table: &ResultsTable) -> String {
    let rows: Vec<ResultRow> = table.iter().map(ResultRow::from).collect();
    Table::new(rows).to_string()
}

/// Buy / hold / sell view.
pub fn render_signals(table: &ResultsTable) -> String {
    let rows: Vec<SignalRow> = table.iter().map(SignalRow::from).collect();
    Table::new(rows).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Signal;

    fn record() -> TickerRecord {
        TickerRecord {
            ticker: "MSFT".into(),
            last_close: 410.456,
            mom260: Some(35.0),
            mom_jt: None,
            relative_strength: Some(12.5),
            volume_score: Some(0.98),
            ma20: Some(405.0),
            ma50: Some(400.0),
            ma130: None,
            ma200: Some(380.0),
            momentum_score: None,
            signal: Some(Signal::Sell),
        }
    }

    #[test]
    fn results_table_shows_values_and_missing_markers() {
        let text = render_results(&vec![record()]);
        assert!(text.contains("Momentum-Score"));
        assert!(text.contains("MSFT"));
        assert!(text.contains("410.46"));
        let row = SignalRow::from(&record());
        assert_eq!(row.score, "-");
    }

    #[test]
    fn signals_table_has_signal_column() {
        let text = render_signals(&vec![record()]);
        assert!(text.contains("Signal"));
        assert!(text.contains("Sell"));
        assert!(text.contains("380.00"));
    }
}
