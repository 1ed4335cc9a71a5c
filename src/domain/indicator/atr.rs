//! Average True Range.
//!
//! TR[0] = high - low, TR[i] = max(H-L, |H-C[i-1]|, |L-C[i-1]|).
//! ATR[n-1] = mean(TR[0..n]), then ATR[i] = (ATR[i-1]*(n-1) + TR[i]) / n.
//! Warmup: first (n-1) bars are undefined.

use crate::domain::ohlcv::true_range;

pub fn true_ranges(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    (0..closes.len())
        .map(|i| {
            if i == 0 {
                highs[0] - lows[0]
            } else {
                true_range(highs[i], lows[i], closes[i - 1])
            }
        })
        .collect()
}

pub fn calculate_atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<f64> {
    let mut results = vec![f64::NAN; closes.len()];
    if closes.len() < period || period == 0 {
        return results;
    }

    let tr_values = true_ranges(highs, lows, closes);
    let seed = tr_values[..period].iter().sum::<f64>() / period as f64;
    results[period - 1] = seed;

    let mut atr = seed;
    for i in period..closes.len() {
        atr = (atr * (period - 1) as f64 + tr_values[i]) / period as f64;
        results[i] = atr;
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atr_basic() {
        let series = calculate_atr(&[110.0; 5], &[90.0; 5], &[100.0; 5], 3);
        assert_eq!(series.len(), 5);
        assert!(series[0].is_nan());
        assert!(series[1].is_nan());
        assert!(series[2..].iter().all(|v| (v - 20.0).abs() < 1e-9));
    }

    #[test]
    fn atr_seed_is_average() {
        let series = calculate_atr(
            &[110.0, 115.0, 120.0],
            &[100.0, 105.0, 110.0],
            &[105.0, 110.0, 115.0],
            3,
        );
        assert!((series[2] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn atr_wilder_smoothing() {
        let series = calculate_atr(
            &[110.0, 115.0, 120.0, 125.0],
            &[100.0, 105.0, 110.0, 115.0],
            &[105.0, 110.0, 115.0, 120.0],
            3,
        );
        let expected = (10.0 * 2.0 + 10.0) / 3.0;
        assert!((series[3] - expected).abs() < 1e-9);
    }

    #[test]
    fn atr_insufficient_bars() {
        let series = calculate_atr(&[110.0, 110.0], &[90.0, 90.0], &[100.0, 100.0], 5);
        assert_eq!(series.len(), 2);
        assert!(series.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn atr_handles_gaps() {
        // bar 1 gaps up: TR = max(10, |130-105|, |120-105|) = 25
        let tr = true_ranges(
            &[110.0, 130.0, 120.0],
            &[100.0, 120.0, 110.0],
            &[105.0, 125.0, 115.0],
        );
        assert_eq!(tr, vec![10.0, 25.0, 15.0]);

        let series = calculate_atr(
            &[110.0, 130.0, 120.0],
            &[100.0, 120.0, 110.0],
            &[105.0, 125.0, 115.0],
            2,
        );
        assert!(series[0].is_nan());
        assert!((series[1] - 17.5).abs() < 1e-9);
        assert!((series[2] - (17.5 + 15.0) / 2.0).abs() < 1e-9);
    }
}
