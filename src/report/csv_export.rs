use crate::model::{ResultsTable, ScreenerError, Signal, TickerRecord};
use crate::utils::format_2dp;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

pub const HEADER: [&str; 12] = [
    "Ticker",
    "Price",
    "MOM260 (%)",
    "MOMJT (%)",
    "Relative Strength (%)",
    "Volume Score",
    "MA20",
    "MA50",
    "MA130",
    "MA200",
    "Momentum-Score",
    "Signal",
];

fn cell(value: Option<f64>) -> String {
    format_2dp(value, "")
}

/// Writes one row per record; numbers carry two decimals and undefined values are empty.
pub fn write_results_csv<W: Write>(writer: W, table: &ResultsTable) -> Result<(), ScreenerError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;

    for r in table {
        wtr.write_record([
            r.ticker.clone(),
            cell(Some(r.last_close)),
            cell(r.mom260),
            cell(r.mom_jt),
            cell(r.relative_strength),
            cell(r.volume_score),
            cell(r.ma20),
            cell(r.ma50),
            cell(r.ma130),
            cell(r.ma200),
            cell(r.momentum_score),
            r.signal.map(|s| s.to_string()).unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn save_results_csv(path: &Path, table: &ResultsTable) -> Result<(), ScreenerError> {
    let file = File::create(path)?;
    write_results_csv(file, table)?;
    info!("Saved {} rows to {}", table.len(), path.display());
    Ok(())
}

fn parse_cell(record: &csv::StringRecord, idx: usize) -> Result<Option<f64>, ScreenerError> {
    let raw = record.get(idx).unwrap_or("").trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>().map(Some).map_err(|_| {
        ScreenerError::InvalidInput(format!("column '{}' has non-numeric value '{}'", HEADER[idx], raw))
    })
}

/// Parses a file produced by [`write_results_csv`] back into records.
pub fn read_results_csv<R: Read>(reader: R) -> Result<Vec<TickerRecord>, ScreenerError> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.iter().ne(HEADER.iter().copied()) {
        return Err(ScreenerError::InvalidInput(format!(
            "unexpected results header: {:?}",
            headers.iter().collect::<Vec<_>>()
        )));
    }

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let last_close = parse_cell(&row, 1)?.ok_or_else(|| {
            ScreenerError::InvalidInput(format!("missing price for {}", row.get(0).unwrap_or("?")))
        })?;

        records.push(TickerRecord {
            ticker: row.get(0).unwrap_or("").to_string(),
            last_close,
            mom260: parse_cell(&row, 2)?,
            mom_jt: parse_cell(&row, 3)?,
            relative_strength: parse_cell(&row, 4)?,
            volume_score: parse_cell(&row, 5)?,
            ma20: parse_cell(&row, 6)?,
            ma50: parse_cell(&row, 7)?,
            ma130: parse_cell(&row, 8)?,
            ma200: parse_cell(&row, 9)?,
            momentum_score: parse_cell(&row, 10)?,
            signal: row.get(11).and_then(Signal::parse),
        });
    }
    Ok(records)
}
