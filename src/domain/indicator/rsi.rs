//! RSI (Relative Strength Index).
//!
//! Per-bar change d[i] = C[i] - C[i-1], with d[0] treated as no change.
//! Gains and losses are smoothed with Wilder's alpha = 1/n, seeded at bar 0.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first (n-1) bars are undefined.

use super::rolling::ewm;

pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.is_empty() {
        return vec![f64::NAN; closes.len()];
    }

    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    gains.push(0.0);
    losses.push(0.0);
    for pair in closes.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let alpha = 1.0 / period as f64;
    let avg_gain = ewm(&gains, alpha, period);
    let avg_loss = ewm(&losses, alpha, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&gain, &loss)| {
            if gain.is_nan() || loss.is_nan() {
                f64::NAN
            } else if loss == 0.0 {
                100.0
            } else {
                100.0 - (100.0 / (1.0 + gain / loss))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_empty_bars() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_single_bar_is_undefined() {
        let series = calculate_rsi(&[100.0], 14);
        assert_eq!(series.len(), 1);
        assert!(series[0].is_nan());
    }

    #[test]
    fn rsi_warmup_period() {
        let closes: Vec<f64> = (1..=15).map(|i| 100.0 + (i as f64 % 5.0) * 2.0).collect();
        let series = calculate_rsi(&closes, 14);

        assert_eq!(series.len(), 15);
        for (i, v) in series.iter().enumerate().take(13) {
            assert!(v.is_nan(), "bar {} should be undefined", i);
        }
        assert!(!series[13].is_nan());
        assert!(!series[14].is_nan());
    }

    #[test]
    fn rsi_all_gains_no_losses() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let series = calculate_rsi(&closes, 14);
        assert!((series[14] - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_all_losses_no_gains() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let series = calculate_rsi(&closes, 14);
        assert!(series[14].abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_in_range() {
        let closes: Vec<f64> = (1..=40)
            .map(|i| 100.0 + (i as f64 % 7.0 - 3.0) * 2.0)
            .collect();
        for v in calculate_rsi(&closes, 14).iter().filter(|v| !v.is_nan()) {
            assert!((0.0..=100.0).contains(v), "RSI {} out of range", v);
        }
    }

    #[test]
    fn rsi_wilder_recursion() {
        // period 2, alpha 0.5: gains [0, 2, 0], losses [0, 0, 1]
        let series = calculate_rsi(&[10.0, 12.0, 11.0], 2);
        let gain = 0.5 * 0.0 + 0.5 * (0.5 * 2.0);
        let loss = 0.5 * 1.0;
        let expected = 100.0 - 100.0 / (1.0 + gain / loss);
        assert!(series[0].is_nan());
        assert!((series[1] - 100.0).abs() < f64::EPSILON);
        assert!((series[2] - expected).abs() < 1e-12);
    }

    #[test]
    fn rsi_zero_period() {
        let series = calculate_rsi(&[100.0, 101.0], 0);
        assert_eq!(series.len(), 2);
        assert!(series.iter().all(|v| v.is_nan()));
    }
}
