//! Price levels: Fibonacci retracements and floor pivot points.
//!
//! Fibonacci levels are static: they are computed once from the highest
//! high and lowest low of the last `lookback` bars.
//!
//! Pivot points use the previous bar:
//! P = (H + L + C) / 3, R1 = 2P - L, S1 = 2P - H, R2 = P + (H - L), S2 = P - (H - L).

pub const DEFAULT_FIB_LOOKBACK: usize = 100;
pub const FIB_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FibLevel {
    pub ratio: f64,
    pub price: f64,
}

impl FibLevel {
    pub fn column_name(&self) -> String {
        format!("Fib_{:?}", self.ratio)
    }
}

/// Retracement levels from the swing high down to the swing low.
/// Returns `None` when there are no bars to measure.
pub fn fibonacci_levels(highs: &[f64], lows: &[f64], lookback: usize) -> Option<Vec<FibLevel>> {
    let start = highs.len().saturating_sub(lookback);
    let max_price = highs[start..]
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .reduce(f64::max)?;
    let min_price = lows[start..]
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .reduce(f64::min)?;
    let diff = max_price - min_price;

    Some(
        FIB_RATIOS
            .iter()
            .map(|&ratio| FibLevel {
                ratio,
                price: if ratio == 1.0 {
                    min_price
                } else {
                    max_price - ratio * diff
                },
            })
            .collect(),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotOutput {
    pub pivot: Vec<f64>,
    pub r1: Vec<f64>,
    pub s1: Vec<f64>,
    pub r2: Vec<f64>,
    pub s2: Vec<f64>,
}

pub fn calculate_pivots(highs: &[f64], lows: &[f64], closes: &[f64]) -> PivotOutput {
    let n = closes.len();
    let mut out = PivotOutput {
        pivot: vec![f64::NAN; n],
        r1: vec![f64::NAN; n],
        s1: vec![f64::NAN; n],
        r2: vec![f64::NAN; n],
        s2: vec![f64::NAN; n],
    };

    for i in 1..n {
        let (h, l, c) = (highs[i - 1], lows[i - 1], closes[i - 1]);
        let p = (h + l + c) / 3.0;
        out.pivot[i] = p;
        out.r1[i] = 2.0 * p - l;
        out.s1[i] = 2.0 * p - h;
        out.r2[i] = p + (h - l);
        out.s2[i] = p - (h - l);
    }
    out
}
