//! Time-indexed working table of named `f64` columns.
//!
//! The base price columns are `Open`, `High`, `Low`, `Close` and `Volume`.
//! Indicators append derived columns; undefined values are `NaN`. Columns
//! keep insertion order and always have the same length as the index.

use chrono::NaiveDateTime;

use crate::domain::error::CoinlabError;
use crate::domain::ohlcv::OhlcvBar;

pub const OPEN: &str = "Open";
pub const HIGH: &str = "High";
pub const LOW: &str = "Low";
pub const CLOSE: &str = "Close";
pub const VOLUME: &str = "Volume";

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    index: Vec<NaiveDateTime>,
    columns: Vec<Column>,
}

impl PriceTable {
    pub fn new(index: Vec<NaiveDateTime>) -> Self {
        Self {
            index,
            columns: Vec::new(),
        }
    }

    /// Build a table with all five base columns from a bar slice.
    pub fn from_bars(bars: &[OhlcvBar]) -> Self {
        let mut table = Self::new(bars.iter().map(|b| b.timestamp).collect());
        table.columns = vec![
            Column::new(OPEN, bars.iter().map(|b| b.open).collect()),
            Column::new(HIGH, bars.iter().map(|b| b.high).collect()),
            Column::new(LOW, bars.iter().map(|b| b.low).collect()),
            Column::new(CLOSE, bars.iter().map(|b| b.close).collect()),
            Column::new(VOLUME, bars.iter().map(|b| b.volume).collect()),
        ];
        table
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Like [`get`](Self::get) but a missing column is an error.
    pub fn column(&self, name: &str) -> Result<&[f64], CoinlabError> {
        self.get(name)
            .ok_or_else(|| CoinlabError::missing_column(name))
    }

    /// Insert a column, replacing any existing column with the same name in place.
    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), CoinlabError> {
        let name = name.into();
        if values.len() != self.index.len() {
            return Err(CoinlabError::invalid_input(format!(
                "column {} has {} values, table has {} rows",
                name,
                values.len(),
                self.index.len()
            )));
        }

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.columns.push(Column { name, values }),
        }
        Ok(())
    }

    pub fn extend_columns(&mut self, columns: Vec<Column>) -> Result<(), CoinlabError> {
        for column in columns {
            self.insert_column(column.name, column.values)?;
        }
        Ok(())
    }

    pub fn with_column(
        mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<Self, CoinlabError> {
        self.insert_column(name, values)?;
        Ok(self)
    }

    pub fn value(&self, name: &str, row: usize) -> Option<f64> {
        self.get(name).and_then(|values| values.get(row).copied())
    }

    /// Value of the column on the last row, `None` when undefined.
    pub fn last_value(&self, name: &str) -> Option<f64> {
        self.get(name)
            .and_then(|values| values.last().copied())
            .filter(|v| !v.is_nan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn bar(day: u32, close: f64) -> OhlcvBar {
        OhlcvBar {
            timestamp: ts(day),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 100.0 * day as f64,
        }
    }

    #[test]
    fn from_bars_builds_base_columns() {
        let table = PriceTable::from_bars(&[bar(1, 10.0), bar(2, 11.0)]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.column_names(),
            vec![OPEN, HIGH, LOW, CLOSE, VOLUME]
        );
        assert_eq!(table.column(CLOSE).unwrap(), &[10.0, 11.0]);
        assert_eq!(table.column(VOLUME).unwrap(), &[100.0, 200.0]);
        assert_eq!(table.index(), &[ts(1), ts(2)]);
    }

    #[test]
    fn missing_column_is_error() {
        let table = PriceTable::new(vec![ts(1)]);
        assert_eq!(
            table.column(CLOSE),
            Err(CoinlabError::missing_column(CLOSE))
        );
    }

    #[test]
    fn insert_appends_then_replaces() {
        let mut table = PriceTable::from_bars(&[bar(1, 10.0), bar(2, 11.0)]);
        table.insert_column("SMA_2", vec![f64::NAN, 10.5]).unwrap();
        assert_eq!(table.column_names().last(), Some(&"SMA_2"));

        table.insert_column("SMA_2", vec![1.0, 2.0]).unwrap();
        assert_eq!(table.columns().len(), 6);
        assert_eq!(table.column("SMA_2").unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn insert_rejects_length_mismatch() {
        let mut table = PriceTable::from_bars(&[bar(1, 10.0)]);
        let err = table.insert_column("X", vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, CoinlabError::InvalidInput { .. }));
    }

    #[test]
    fn last_value_skips_nan_tail() {
        let table = PriceTable::new(vec![ts(1), ts(2)])
            .with_column("A", vec![1.0, f64::NAN])
            .unwrap()
            .with_column("B", vec![1.0, 2.0])
            .unwrap();
        assert_eq!(table.last_value("A"), None);
        assert_eq!(table.last_value("B"), Some(2.0));
        assert_eq!(table.value("B", 0), Some(1.0));
        assert_eq!(table.value("B", 5), None);
    }

    #[test]
    fn clone_is_independent() {
        let base = PriceTable::from_bars(&[bar(1, 10.0)]);
        let mut copy = base.clone();
        copy.insert_column("X", vec![1.0]).unwrap();
        assert!(!base.has_column("X"));
        assert!(copy.has_column("X"));
    }
}
