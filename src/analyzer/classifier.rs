use crate::config::SignalThresholds;
use crate::model::{Signal, TickerRecord};

/// Maps a record to Buy/Hold/Sell. First matching rule wins:
///
/// - Buy: score above the buy threshold and the last close above both MA50 and MA200
/// - Hold: score above the hold threshold and the last close above MA200
/// - Sell: everything else
///
/// A comparison against an undefined value is false, so missing history routes to Sell.
pub fn classify(record: &TickerRecord, thresholds: &SignalThresholds) -> Signal {
    let score_above = |limit: f64| record.momentum_score.is_some_and(|s| s > limit);
    let close_above = |ma: Option<f64>| ma.is_some_and(|m| record.last_close > m);

    if score_above(thresholds.buy) && close_above(record.ma50) && close_above(record.ma200) {
        Signal::Buy
    } else if score_above(thresholds.hold) && close_above(record.ma200) {
        Signal::Hold
    } else {
        Signal::Sell
    }
}

/// Attaches a signal to every record.
pub fn classify_all(records: &mut [TickerRecord], thresholds: &SignalThresholds) {
    for record in records.iter_mut() {
        record.signal = Some(classify(record, thresholds));
    }
}
