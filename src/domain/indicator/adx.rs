//! ADX (Average Directional Index), Wilder's formulation.
//!
//! For i >= 1: +DM = H[i]-H[i-1] when it exceeds L[i-1]-L[i] and is positive,
//! -DM symmetrically; TR is the true range against C[i-1].
//! TR, +DM and -DM are Wilder-smoothed (seed = sum of bars 1..=n,
//! then S = S - S/n + x). DI± = 100 × S(±DM) / S(TR),
//! DX = 100 × |DI+ - DI-| / (DI+ + DI-).
//! ADX seed = mean of the first n DX values, then (prev × (n-1) + DX) / n.
//!
//! Warmup: first (2n - 1) bars are undefined.

use crate::domain::ohlcv::true_range;

pub fn calculate_adx(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len();
    let mut adx = vec![f64::NAN; n];
    if period == 0 || n < 2 * period {
        return adx;
    }

    let mut tr = vec![0.0; n];
    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];
    for i in 1..n {
        tr[i] = true_range(highs[i], lows[i], closes[i - 1]);
        let up = highs[i] - highs[i - 1];
        let down = lows[i - 1] - lows[i];
        if up > down && up > 0.0 {
            plus_dm[i] = up;
        }
        if down > up && down > 0.0 {
            minus_dm[i] = down;
        }
    }

    let p = period as f64;
    let mut s_tr: f64 = tr[1..=period].iter().sum();
    let mut s_plus: f64 = plus_dm[1..=period].iter().sum();
    let mut s_minus: f64 = minus_dm[1..=period].iter().sum();

    let mut dx = vec![f64::NAN; n];
    for i in period..n {
        if i > period {
            s_tr = s_tr - s_tr / p + tr[i];
            s_plus = s_plus - s_plus / p + plus_dm[i];
            s_minus = s_minus - s_minus / p + minus_dm[i];
        }
        let (di_plus, di_minus) = if s_tr == 0.0 {
            (0.0, 0.0)
        } else {
            (100.0 * s_plus / s_tr, 100.0 * s_minus / s_tr)
        };
        let di_sum = di_plus + di_minus;
        dx[i] = if di_sum == 0.0 {
            0.0
        } else {
            100.0 * (di_plus - di_minus).abs() / di_sum
        };
    }

    let first = 2 * period - 1;
    let mut value = dx[period..=first].iter().sum::<f64>() / p;
    adx[first] = value;
    for i in (first + 1)..n {
        value = (value * (p - 1.0) + dx[i]) / p;
        adx[i] = value;
    }
    adx
}
