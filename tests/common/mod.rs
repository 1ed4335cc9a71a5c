#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use coinlab::domain::error::CoinlabError;
pub use coinlab::domain::ohlcv::OhlcvBar;
use coinlab::domain::table::PriceTable;
use coinlab::ports::data_port::DataPort;
use std::collections::HashMap;
use std::path::Path;

pub struct MockDataPort {
    pub data: HashMap<String, PriceTable>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_table(mut self, ticker: &str, table: PriceTable) -> Self {
        self.data.insert(ticker.to_string(), table);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(&self, ticker: &str) -> Result<PriceTable, CoinlabError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(CoinlabError::Data {
                reason: reason.clone(),
            });
        }
        self.data.get(ticker).cloned().ok_or_else(|| CoinlabError::Data {
            reason: format!("no data for {}", ticker),
        })
    }

    fn list_tickers(&self) -> Result<Vec<String>, CoinlabError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}

pub fn day(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::Duration::days(i as i64)
}

pub fn make_bar(i: usize, close: f64) -> OhlcvBar {
    OhlcvBar {
        timestamp: day(i),
        open: close - 0.5,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000.0 + (i % 7) as f64 * 100.0,
    }
}

pub fn table_from_closes(closes: &[f64]) -> PriceTable {
    let bars: Vec<OhlcvBar> = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i, c))
        .collect();
    PriceTable::from_bars(&bars)
}

/// A table with only a `Close` column.
pub fn close_only_table(closes: &[f64]) -> PriceTable {
    PriceTable::new((0..closes.len()).map(day).collect())
        .with_column("Close", closes.to_vec())
        .unwrap()
}

/// Oscillating series around 100, long enough for every default window.
pub fn wave_closes(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| 100.0 + (i as f64 * 0.3).sin() * 8.0 + i as f64 * 0.05)
        .collect()
}

pub fn rising_closes(count: usize, start: f64) -> Vec<f64> {
    (0..count).map(|i| start + i as f64).collect()
}

/// Write `{dir}/{ticker}.csv` in the format the CSV adapter reads.
pub fn write_price_csv(dir: &Path, ticker: &str, closes: &[f64]) {
    let mut content = String::from("Date,Open,High,Low,Close,Volume\n");
    for (i, &c) in closes.iter().enumerate() {
        let bar = make_bar(i, c);
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.timestamp.format("%Y-%m-%d"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        ));
    }
    std::fs::write(dir.join(format!("{}.csv", ticker)), content).unwrap();
}
