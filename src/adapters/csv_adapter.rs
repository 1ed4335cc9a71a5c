//! CSV file data adapter.
//!
//! Each ticker lives in `{base}/{ticker}.csv` with a header row. Recognised
//! headers (case-insensitive): `date`/`timestamp`/`time`, `open`, `high`,
//! `low`, `close`, `volume`. Price columns absent from the file are absent
//! from the table; empty cells become `NaN`.

use crate::domain::error::CoinlabError;
use crate::domain::table::{CLOSE, HIGH, LOW, OPEN, PriceTable, VOLUME};
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

const PRICE_COLUMNS: [&str; 5] = [OPEN, HIGH, LOW, CLOSE, VOLUME];

fn data_error(reason: impl Into<String>) -> CoinlabError {
    CoinlabError::Data {
        reason: reason.into(),
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` (or with `T`) and RFC 3339.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Some(ts);
        }
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.naive_utc())
}

impl DataPort for CsvAdapter {
    fn fetch_series(&self, ticker: &str) -> Result<PriceTable, CoinlabError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path)
            .map_err(|e| data_error(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| data_error(format!("CSV header error: {}", e)))?
            .clone();
        if headers.is_empty() {
            return Ok(PriceTable::default());
        }

        let mut time_idx = None;
        let mut price_idx: Vec<(usize, &str)> = Vec::new();
        for (i, header) in headers.iter().enumerate() {
            let header = header.trim().to_ascii_lowercase();
            match header.as_str() {
                "date" | "timestamp" | "time" | "datetime" if time_idx.is_none() => {
                    time_idx = Some(i)
                }
                _ => {
                    if let Some(name) = PRICE_COLUMNS
                        .iter()
                        .find(|name| name.eq_ignore_ascii_case(&header))
                    {
                        price_idx.push((i, *name));
                    }
                }
            }
        }
        let time_idx = time_idx.ok_or_else(|| {
            data_error(format!("{} has no date/timestamp column", path.display()))
        })?;

        let mut rows: Vec<(NaiveDateTime, Vec<f64>)> = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| data_error(format!("CSV parse error: {}", e)))?;

            let raw_time = record.get(time_idx).unwrap_or_default();
            let timestamp = parse_timestamp(raw_time).ok_or_else(|| {
                data_error(format!("invalid timestamp '{}' on row {}", raw_time, line + 1))
            })?;

            let mut values = Vec::with_capacity(price_idx.len());
            for &(i, name) in &price_idx {
                let raw = record.get(i).unwrap_or_default().trim();
                let value = if raw.is_empty() {
                    f64::NAN
                } else {
                    raw.parse::<f64>().map_err(|e| {
                        data_error(format!("invalid {} value '{}': {}", name, raw, e))
                    })?
                };
                values.push(value);
            }
            rows.push((timestamp, values));
        }

        rows.sort_by_key(|(ts, _)| *ts);

        let mut table = PriceTable::new(rows.iter().map(|(ts, _)| *ts).collect());
        for (col, &(_, name)) in price_idx.iter().enumerate() {
            table.insert_column(name, rows.iter().map(|(_, v)| v[col]).collect())?;
        }
        Ok(table)
    }

    fn list_tickers(&self) -> Result<Vec<String>, CoinlabError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            data_error(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut tickers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| data_error(format!("directory entry error: {}", e)))?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(ticker) = name_str.strip_suffix(".csv") {
                tickers.push(ticker.to_string());
            }
        }

        tickers.sort();
        Ok(tickers)
    }
}
