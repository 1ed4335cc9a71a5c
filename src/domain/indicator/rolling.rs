//! Rolling-window and exponential smoothing primitives shared by indicators.
//!
//! A window containing any `NaN`, or a row without a full window of
//! history, produces `NaN`.

pub fn rolling<F>(values: &[f64], window: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 {
        return out;
    }
    for i in (window - 1)..values.len() {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[i] = f(slice);
    }
    out
}

pub fn rolling_sum(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |w| w.iter().sum())
}

pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, mean)
}

pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |w| w.iter().copied().fold(f64::MIN, f64::max))
}

pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |w| w.iter().copied().fold(f64::MAX, f64::min))
}

/// Population standard deviation (divides by N).
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |w| {
        let m = mean(w);
        let variance = w.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / w.len() as f64;
        variance.sqrt()
    })
}

pub fn rolling_mean_abs_dev(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |w| {
        let m = mean(w);
        w.iter().map(|v| (v - m).abs()).sum::<f64>() / w.len() as f64
    })
}

/// Exponentially weighted mean without bias adjustment.
///
/// The recursion starts at the first defined value; outputs are masked
/// until `min_periods` defined values have been seen. Undefined inputs
/// after the start produce `NaN` and leave the running state untouched.
pub fn ewm(values: &[f64], alpha: f64, min_periods: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    let mut state: Option<f64> = None;
    let mut seen = 0usize;

    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        let next = match state {
            None => v,
            Some(prev) => alpha * v + (1.0 - alpha) * prev,
        };
        state = Some(next);
        seen += 1;
        if seen >= min_periods {
            out[i] = next;
        }
    }
    out
}

/// Element-wise ratio; a zero or undefined denominator yields `NaN`.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || denominator.is_nan() {
        f64::NAN
    } else {
        numerator / denominator
    }
}

fn mean(window: &[f64]) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}
