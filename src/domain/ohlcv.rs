//! OHLCV bar representation.

use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// (high + low + close) / 3
pub fn typical_price(high: f64, low: f64, close: f64) -> f64 {
    (high + low + close) / 3.0
}

/// max(high - low, |high - prev_close|, |low - prev_close|)
pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    let hl = high - low;
    let hc = (high - prev_close).abs();
    let lc = (low - prev_close).abs();
    hl.max(hc).max(lc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typical_price_is_hlc_mean() {
        let expected = (110.0 + 90.0 + 105.0) / 3.0;
        assert!((typical_price(110.0, 90.0, 105.0) - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_hl_dominates() {
        // high-low=20, |high-100|=10, |low-100|=10 → 20
        assert!((true_range(110.0, 90.0, 100.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gaps() {
        // gap up: |110-70|=40; gap down: |90-130|=40
        assert!((true_range(110.0, 90.0, 70.0) - 40.0).abs() < f64::EPSILON);
        assert!((true_range(110.0, 90.0, 130.0) - 40.0).abs() < f64::EPSILON);
    }
}
