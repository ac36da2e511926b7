// Utility functions
use chrono::NaiveDate;

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").ok()
}

/// Two-decimal text for presentation; `None` renders as `missing`.
pub fn format_2dp(value: Option<f64>, missing: &str) -> String {
    match value {
        Some(v) => {
            let text = format!("{:.2}", v);
            // values that round to zero keep no sign
            if text == "-0.00" { "0.00".to_string() } else { text }
        }
        None => missing.to_string(),
    }
}
