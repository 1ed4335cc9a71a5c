//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of the defined MACD values
//! Difference = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: line defined from max(fast, slow) - 1, signal and difference
//! from max(fast, slow) - 1 + signal - 1.

use super::ema::calculate_ema;
use super::rolling::ewm;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdOutput {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub difference: Vec<f64>,
}

pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal_period: usize) -> MacdOutput {
    if fast == 0 || slow == 0 || signal_period == 0 {
        let undefined = vec![f64::NAN; closes.len()];
        return MacdOutput {
            line: undefined.clone(),
            signal: undefined.clone(),
            difference: undefined,
        };
    }

    let ema_fast = calculate_ema(closes, fast);
    let ema_slow = calculate_ema(closes, slow);
    let line: Vec<f64> = ema_fast.iter().zip(&ema_slow).map(|(f, s)| f - s).collect();

    let k = 2.0 / (signal_period as f64 + 1.0);
    let signal = ewm(&line, k, signal_period);
    let difference = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

    MacdOutput {
        line,
        signal,
        difference,
    }
}

pub fn calculate_macd_default(closes: &[f64]) -> MacdOutput {
    calculate_macd(closes, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rising(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn macd_warmup_default() {
        let out = calculate_macd_default(&rising(40));

        assert!(out.line[DEFAULT_SLOW - 2].is_nan());
        assert!(!out.line[DEFAULT_SLOW - 1].is_nan());

        let warmup = DEFAULT_SLOW - 1 + DEFAULT_SIGNAL - 1;
        for i in 0..warmup {
            assert!(out.signal[i].is_nan(), "index {} should be undefined", i);
        }
        assert!(!out.signal[warmup].is_nan());
        assert!(!out.difference[warmup].is_nan());
    }

    #[test]
    fn macd_difference_equals_line_minus_signal() {
        let out = calculate_macd_default(&rising(40));
        for i in 0..40 {
            if !out.signal[i].is_nan() {
                assert!((out.difference[i] - (out.line[i] - out.signal[i])).abs() < f64::EPSILON);
            }
        }
    }

    #[test]
    fn macd_line_is_ema_fast_minus_ema_slow() {
        let closes = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];
        let out = calculate_macd(&closes, 3, 5, 2);
        let fast = calculate_ema(&closes, 3);
        let slow = calculate_ema(&closes, 5);

        for i in 4..closes.len() {
            assert!(
                (out.line[i] - (fast[i] - slow[i])).abs() < f64::EPSILON,
                "MACD line mismatch at index {}",
                i
            );
        }
    }

    #[test]
    fn macd_empty_bars() {
        let out = calculate_macd_default(&[]);
        assert!(out.line.is_empty());
        assert!(out.signal.is_empty());
    }

    #[test]
    fn macd_zero_period() {
        let closes = [100.0, 101.0, 102.0];
        for out in [
            calculate_macd(&closes, 0, 26, 9),
            calculate_macd(&closes, 12, 0, 9),
            calculate_macd(&closes, 12, 26, 0),
        ] {
            assert_eq!(out.line.len(), 3);
            assert!(out.line.iter().all(|v| v.is_nan()));
        }
    }

    #[test]
    fn macd_custom_parameters() {
        let out = calculate_macd(&rising(20), 5, 10, 3);
        let warmup = 10 - 1 + 3 - 1;
        assert!(out.signal[warmup - 1].is_nan());
        assert!(!out.signal[warmup].is_nan());
    }

    #[test]
    fn macd_default_constants() {
        assert_eq!(DEFAULT_FAST, 12);
        assert_eq!(DEFAULT_SLOW, 26);
        assert_eq!(DEFAULT_SIGNAL, 9);
    }
}
