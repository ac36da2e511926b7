// Ticker list normalization from free text or an uploaded CSV file
use crate::model::ScreenerError;
use std::io::Read;

pub const TICKER_COLUMN: &str = "Ticker";

fn normalize(raw: &str) -> Option<String> {
    let ticker = raw.trim().to_uppercase();
    (!ticker.is_empty()).then_some(ticker)
}

/// Splits a delimited list on commas, semicolons or whitespace.
/// Blank entries are dropped; duplicates and order are kept.
pub fn parse_ticker_list(input: &str) -> Vec<String> {
    input
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter_map(normalize)
        .collect()
}

/// Reads tickers from the `Ticker` column of a CSV upload.
///
/// The header is matched case-insensitively after trimming. A missing column is
/// an input error; empty cells are skipped.
pub fn read_ticker_csv<R: Read>(reader: R) -> Result<Vec<String>, ScreenerError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let column = rdr
        .headers()?
        .iter()
        .position(|h| h.trim().trim_start_matches('\u{feff}').eq_ignore_ascii_case(TICKER_COLUMN))
        .ok_or_else(|| {
            ScreenerError::InvalidInput(format!("uploaded file has no '{}' column", TICKER_COLUMN))
        })?;

    let mut tickers = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if let Some(ticker) = record.get(column).and_then(normalize) {
            tickers.push(ticker);
        }
    }
    Ok(tickers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_is_trimmed_and_uppercased() {
        assert_eq!(
            parse_ticker_list(" aapl, msft ,tsla,, nvda "),
            vec!["AAPL", "MSFT", "TSLA", "NVDA"]
        );
    }

    #[test]
    fn list_accepts_mixed_separators_and_keeps_duplicates() {
        assert_eq!(parse_ticker_list("aapl;AAPL\nmsft  sap.de"), vec!["AAPL", "AAPL", "MSFT", "SAP.DE"]);
    }

    #[test]
    fn blank_list_is_empty() {
        assert!(parse_ticker_list(" , ;  ").is_empty());
    }

    #[test]
    fn csv_reads_ticker_column() {
        let data = "Name,ticker,Weight\nApple,aapl,0.5\nBlank,,0.1\nMicrosoft, msft ,0.4\n";
        assert_eq!(read_ticker_csv(data.as_bytes()).unwrap(), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn csv_handles_byte_order_mark() {
        let data = "\u{feff}Ticker\nnvda\n";
        assert_eq!(read_ticker_csv(data.as_bytes()).unwrap(), vec!["NVDA"]);
    }

    #[test]
    fn csv_without_ticker_column_is_invalid() {
        let data = "Symbol,Weight\nAAPL,1\n";
        let err = read_ticker_csv(data.as_bytes()).unwrap_err();
        assert!(matches!(err, ScreenerError::InvalidInput(_)));
    }
}
