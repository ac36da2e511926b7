use crate::model::{ResultsTable, TickerRecord};
use std::cmp::Ordering;

/// Highest score first; undefined scores go last.
fn by_score_desc(a: &TickerRecord, b: &TickerRecord) -> Ordering {
    match (a.momentum_score, b.momentum_score) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Builds the results table. The sort is stable, so equal scores keep input order.
pub fn rank(mut records: Vec<TickerRecord>) -> ResultsTable {
    records.sort_by(by_score_desc);
    records
}
