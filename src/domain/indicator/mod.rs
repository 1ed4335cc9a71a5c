//! Technical indicator engine.
//!
//! - `IndicatorKind`: indicator identity, name dispatch and parameter keys
//! - `IndicatorType`: indicator identity + parameters (serves as HashMap key)
//! - `compute` / `compute_indicator`: derive named columns from a [`PriceTable`]
//! - `apply_indicator`: append the derived columns to the working table
//!
//! Every indicator is a pure function of the table and its parameters.
//! Series shorter than the window produce leading `NaN` values, never an
//! error; a missing base column is an error naming the column.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod heikin_ashi;
pub mod ichimoku;
pub mod levels;
pub mod macd;
pub mod obv;
pub mod oscillator;
pub mod rolling;
pub mod rsi;
pub mod volume;

use std::fmt;

use crate::domain::error::CoinlabError;
use crate::domain::params::ParamSet;
use crate::domain::table::{CLOSE, Column, HIGH, LOW, OPEN, PriceTable, VOLUME};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
    Macd,
    Stochastic,
    Cci,
    Bollinger,
    Atr,
    Obv,
    VolumeOscillator,
    Cmf,
    Ichimoku,
    HeikinAshi,
    Fibonacci,
    Pivot,
    Adx,
    WilliamsR,
}

/// A parameter key an indicator reads from a [`ParamSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub key: &'static str,
    pub default: usize,
    /// Must be present in the search ranges when the indicator is tuned.
    pub required: bool,
}

const fn required(key: &'static str, default: usize) -> ParamSpec {
    ParamSpec {
        key,
        default,
        required: true,
    }
}

const fn optional(key: &'static str, default: usize) -> ParamSpec {
    ParamSpec {
        key,
        default,
        required: false,
    }
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 17] = [
        IndicatorKind::Sma,
        IndicatorKind::Ema,
        IndicatorKind::Rsi,
        IndicatorKind::Macd,
        IndicatorKind::Stochastic,
        IndicatorKind::Cci,
        IndicatorKind::Bollinger,
        IndicatorKind::Atr,
        IndicatorKind::Obv,
        IndicatorKind::VolumeOscillator,
        IndicatorKind::Cmf,
        IndicatorKind::Ichimoku,
        IndicatorKind::HeikinAshi,
        IndicatorKind::Fibonacci,
        IndicatorKind::Pivot,
        IndicatorKind::Adx,
        IndicatorKind::WilliamsR,
    ];

    /// Resolve a display name or alias, case-insensitively.
    pub fn from_name(name: &str) -> Result<Self, CoinlabError> {
        let normalized: String = name
            .trim()
            .to_ascii_uppercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();

        let kind = match normalized.as_str() {
            "SMA" => IndicatorKind::Sma,
            "EMA" => IndicatorKind::Ema,
            "RSI" => IndicatorKind::Rsi,
            "MACD" => IndicatorKind::Macd,
            "STOCHASTIC" | "STOCH" => IndicatorKind::Stochastic,
            "CCI" => IndicatorKind::Cci,
            "BOLLINGERBANDS" | "BOLLINGER" | "BB" => IndicatorKind::Bollinger,
            "ATR" => IndicatorKind::Atr,
            "OBV" => IndicatorKind::Obv,
            "VOLUMEOSCILLATOR" | "VO" => IndicatorKind::VolumeOscillator,
            "CMF" | "CHAIKINMONEYFLOW" => IndicatorKind::Cmf,
            "ICHIMOKU" => IndicatorKind::Ichimoku,
            "HEIKINASHI" | "HA" => IndicatorKind::HeikinAshi,
            "FIBONACCI" | "FIB" | "FIBRETRACEMENT" => IndicatorKind::Fibonacci,
            "PIVOT" | "PIVOTPOINTS" => IndicatorKind::Pivot,
            "ADX" => IndicatorKind::Adx,
            "WILLIAMS%R" | "WILLIAMSR" | "WILLR" => IndicatorKind::WilliamsR,
            _ => {
                return Err(CoinlabError::UnknownIndicator {
                    name: name.to_string(),
                });
            }
        };
        Ok(kind)
    }

    pub fn name(&self) -> &'static str {
        match self {
            IndicatorKind::Sma => "SMA",
            IndicatorKind::Ema => "EMA",
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::Macd => "MACD",
            IndicatorKind::Stochastic => "Stochastic",
            IndicatorKind::Cci => "CCI",
            IndicatorKind::Bollinger => "Bollinger Bands",
            IndicatorKind::Atr => "ATR",
            IndicatorKind::Obv => "OBV",
            IndicatorKind::VolumeOscillator => "Volume Oscillator",
            IndicatorKind::Cmf => "CMF",
            IndicatorKind::Ichimoku => "Ichimoku",
            IndicatorKind::HeikinAshi => "Heikin-Ashi",
            IndicatorKind::Fibonacci => "Fibonacci",
            IndicatorKind::Pivot => "Pivot",
            IndicatorKind::Adx => "ADX",
            IndicatorKind::WilliamsR => "Williams %R",
        }
    }

    pub fn params(&self) -> &'static [ParamSpec] {
        match self {
            IndicatorKind::Sma => const { &[required("SMA", 20)] },
            IndicatorKind::Ema => const { &[required("EMA", 20)] },
            IndicatorKind::Rsi => const { &[required("RSI", 14)] },
            IndicatorKind::Macd => const { &[
                optional("MACD_fast", macd::DEFAULT_FAST),
                optional("MACD_slow", macd::DEFAULT_SLOW),
                optional("MACD_signal", macd::DEFAULT_SIGNAL),
            ] },
            IndicatorKind::Stochastic => const { &[
                required("Stochastic", 14),
                optional("Stochastic_smooth", oscillator::DEFAULT_SMOOTH),
            ] },
            IndicatorKind::Cci => const { &[required("CCI", 20)] },
            IndicatorKind::Bollinger => const { &[
                required("BB", bollinger::DEFAULT_PERIOD),
                optional("BB_dev", 2),
            ] },
            IndicatorKind::Atr => const { &[required("ATR", 14)] },
            IndicatorKind::Obv => const { &[] },
            IndicatorKind::VolumeOscillator => const { &[optional("VO_short", 12), optional("VO_long", 26)] },
            IndicatorKind::Cmf => const { &[required("CMF", 20)] },
            IndicatorKind::Ichimoku => const { &[
                optional("Ichimoku_conversion", ichimoku::DEFAULT_CONVERSION),
                optional("Ichimoku_base", ichimoku::DEFAULT_BASE),
                optional("Ichimoku_span_b", ichimoku::DEFAULT_SPAN_B),
            ] },
            IndicatorKind::HeikinAshi => const { &[] },
            IndicatorKind::Fibonacci => const { &[optional("Fib", levels::DEFAULT_FIB_LOOKBACK)] },
            IndicatorKind::Pivot => const { &[] },
            IndicatorKind::Adx => const { &[required("ADX", 14)] },
            IndicatorKind::WilliamsR => const { &[required("WilliamsR", 14)] },
        }
    }

    /// Whether the default signal rules have a line to compare against close.
    pub fn has_signal_column(&self) -> bool {
        !matches!(
            self,
            IndicatorKind::Obv
                | IndicatorKind::VolumeOscillator
                | IndicatorKind::Ichimoku
                | IndicatorKind::HeikinAshi
                | IndicatorKind::Fibonacci
                | IndicatorKind::Pivot
        )
    }

    /// Build the concrete indicator, taking defaults for absent keys.
    pub fn build(&self, params: &ParamSet) -> IndicatorType {
        let p = |key: &str| {
            let default = self
                .params()
                .iter()
                .find(|spec| spec.key == key)
                .map(|spec| spec.default)
                .unwrap_or(0);
            params.get_or(key, default)
        };

        match self {
            IndicatorKind::Sma => IndicatorType::Sma(p("SMA")),
            IndicatorKind::Ema => IndicatorType::Ema(p("EMA")),
            IndicatorKind::Rsi => IndicatorType::Rsi(p("RSI")),
            IndicatorKind::Macd => IndicatorType::Macd {
                fast: p("MACD_fast"),
                slow: p("MACD_slow"),
                signal: p("MACD_signal"),
            },
            IndicatorKind::Stochastic => IndicatorType::Stochastic {
                period: p("Stochastic"),
                smooth: p("Stochastic_smooth"),
            },
            IndicatorKind::Cci => IndicatorType::Cci(p("CCI")),
            IndicatorKind::Bollinger => IndicatorType::Bollinger {
                period: p("BB"),
                stddev_mult_x100: (p("BB_dev") * 100) as u32,
            },
            IndicatorKind::Atr => IndicatorType::Atr(p("ATR")),
            IndicatorKind::Obv => IndicatorType::Obv,
            IndicatorKind::VolumeOscillator => IndicatorType::VolumeOscillator {
                short: p("VO_short"),
                long: p("VO_long"),
            },
            IndicatorKind::Cmf => IndicatorType::Cmf(p("CMF")),
            IndicatorKind::Ichimoku => IndicatorType::Ichimoku {
                conversion: p("Ichimoku_conversion"),
                base: p("Ichimoku_base"),
                span_b: p("Ichimoku_span_b"),
            },
            IndicatorKind::HeikinAshi => IndicatorType::HeikinAshi,
            IndicatorKind::Fibonacci => IndicatorType::Fibonacci { lookback: p("Fib") },
            IndicatorKind::Pivot => IndicatorType::Pivot,
            IndicatorKind::Adx => IndicatorType::Adx(p("ADX")),
            IndicatorKind::WilliamsR => IndicatorType::WilliamsR(p("WilliamsR")),
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Stochastic {
        period: usize,
        smooth: usize,
    },
    Cci(usize),
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
    Atr(usize),
    Obv,
    VolumeOscillator {
        short: usize,
        long: usize,
    },
    Cmf(usize),
    Ichimoku {
        conversion: usize,
        base: usize,
        span_b: usize,
    },
    HeikinAshi,
    Fibonacci {
        lookback: usize,
    },
    Pivot,
    Adx(usize),
    WilliamsR(usize),
}

impl IndicatorType {
    pub fn kind(&self) -> IndicatorKind {
        match self {
            IndicatorType::Sma(_) => IndicatorKind::Sma,
            IndicatorType::Ema(_) => IndicatorKind::Ema,
            IndicatorType::Rsi(_) => IndicatorKind::Rsi,
            IndicatorType::Macd { .. } => IndicatorKind::Macd,
            IndicatorType::Stochastic { .. } => IndicatorKind::Stochastic,
            IndicatorType::Cci(_) => IndicatorKind::Cci,
            IndicatorType::Bollinger { .. } => IndicatorKind::Bollinger,
            IndicatorType::Atr(_) => IndicatorKind::Atr,
            IndicatorType::Obv => IndicatorKind::Obv,
            IndicatorType::VolumeOscillator { .. } => IndicatorKind::VolumeOscillator,
            IndicatorType::Cmf(_) => IndicatorKind::Cmf,
            IndicatorType::Ichimoku { .. } => IndicatorKind::Ichimoku,
            IndicatorType::HeikinAshi => IndicatorKind::HeikinAshi,
            IndicatorType::Fibonacci { .. } => IndicatorKind::Fibonacci,
            IndicatorType::Pivot => IndicatorKind::Pivot,
            IndicatorType::Adx(_) => IndicatorKind::Adx,
            IndicatorType::WilliamsR(_) => IndicatorKind::WilliamsR,
        }
    }

    fn windows(&self) -> Vec<usize> {
        match *self {
            IndicatorType::Sma(w)
            | IndicatorType::Ema(w)
            | IndicatorType::Rsi(w)
            | IndicatorType::Cci(w)
            | IndicatorType::Atr(w)
            | IndicatorType::Cmf(w)
            | IndicatorType::Adx(w)
            | IndicatorType::WilliamsR(w) => vec![w],
            IndicatorType::Macd { fast, slow, signal } => vec![fast, slow, signal],
            IndicatorType::Stochastic { period, smooth } => vec![period, smooth],
            IndicatorType::Bollinger { period, .. } => vec![period],
            IndicatorType::VolumeOscillator { short, long } => vec![short, long],
            IndicatorType::Ichimoku {
                conversion,
                base,
                span_b,
            } => vec![conversion, base, span_b],
            IndicatorType::Fibonacci { lookback } => vec![lookback],
            IndicatorType::Obv | IndicatorType::HeikinAshi | IndicatorType::Pivot => vec![],
        }
    }

    /// Names of the columns this indicator produces, in output order.
    pub fn column_names(&self) -> Vec<String> {
        match self {
            IndicatorType::Sma(w) => vec![format!("SMA_{}", w)],
            IndicatorType::Ema(w) => vec![format!("EMA_{}", w)],
            IndicatorType::Rsi(w) => vec![format!("RSI_{}", w)],
            IndicatorType::Macd { fast, slow, signal } => vec![
                format!("MACD_{}_{}", fast, slow),
                format!("MACD_SIGNAL_{}_{}_{}", fast, slow, signal),
                format!("MACD_DIFF_{}_{}_{}", fast, slow, signal),
            ],
            IndicatorType::Stochastic { period, .. } => {
                vec![format!("STOCH_K_{}", period), format!("STOCH_D_{}", period)]
            }
            IndicatorType::Cci(w) => vec![format!("CCI_{}", w)],
            IndicatorType::Bollinger { period, .. } => vec![
                format!("BB_High_{}", period),
                format!("BB_Low_{}", period),
                format!("BB_Mavg_{}", period),
                format!("BB_Width_{}", period),
            ],
            IndicatorType::Atr(w) => vec![format!("ATR_{}", w)],
            IndicatorType::Obv => vec!["OBV".into()],
            IndicatorType::VolumeOscillator { short, long } => {
                vec![format!("Volume_Osc_{}_{}", short, long)]
            }
            IndicatorType::Cmf(w) => vec![format!("CMF_{}", w)],
            IndicatorType::Ichimoku { .. } => vec![
                "Ichimoku_A".into(),
                "Ichimoku_B".into(),
                "Ichimoku_base_line".into(),
                "Ichimoku_conversion_line".into(),
            ],
            IndicatorType::HeikinAshi => vec![
                "HA_Open".into(),
                "HA_High".into(),
                "HA_Low".into(),
                "HA_Close".into(),
            ],
            IndicatorType::Fibonacci { .. } => levels::FIB_RATIOS
                .iter()
                .map(|r| format!("Fib_{:?}", r))
                .collect(),
            IndicatorType::Pivot => vec![
                "Pivot".into(),
                "Pivot_R1".into(),
                "Pivot_S1".into(),
                "Pivot_R2".into(),
                "Pivot_S2".into(),
            ],
            IndicatorType::Adx(w) => vec![format!("ADX_{}", w)],
            IndicatorType::WilliamsR(w) => vec![format!("WilliamsR_{}", w)],
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Stochastic { period, smooth } => {
                write!(f, "STOCHASTIC({},{})", period, smooth)
            }
            IndicatorType::Cci(period) => write!(f, "CCI({})", period),
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Obv => write!(f, "OBV"),
            IndicatorType::VolumeOscillator { short, long } => write!(f, "VO({},{})", short, long),
            IndicatorType::Cmf(period) => write!(f, "CMF({})", period),
            IndicatorType::Ichimoku {
                conversion,
                base,
                span_b,
            } => write!(f, "ICHIMOKU({},{},{})", conversion, base, span_b),
            IndicatorType::HeikinAshi => write!(f, "HEIKIN_ASHI"),
            IndicatorType::Fibonacci { lookback } => write!(f, "FIBONACCI({})", lookback),
            IndicatorType::Pivot => write!(f, "PIVOT"),
            IndicatorType::Adx(period) => write!(f, "ADX({})", period),
            IndicatorType::WilliamsR(period) => write!(f, "WILLIAMS_R({})", period),
        }
    }
}

/// Derive the columns of `indicator` from `table` without modifying it.
pub fn compute(table: &PriceTable, indicator: &IndicatorType) -> Result<Vec<Column>, CoinlabError> {
    if indicator.windows().contains(&0) {
        return Err(CoinlabError::invalid_input(format!(
            "{} requires positive window lengths",
            indicator
        )));
    }

    let values: Vec<Vec<f64>> = match *indicator {
        IndicatorType::Sma(w) => vec![ema::calculate_sma(table.column(CLOSE)?, w)],
        IndicatorType::Ema(w) => vec![ema::calculate_ema(table.column(CLOSE)?, w)],
        IndicatorType::Rsi(w) => vec![rsi::calculate_rsi(table.column(CLOSE)?, w)],
        IndicatorType::Macd { fast, slow, signal } => {
            let out = macd::calculate_macd(table.column(CLOSE)?, fast, slow, signal);
            vec![out.line, out.signal, out.difference]
        }
        IndicatorType::Stochastic { period, smooth } => {
            let (h, l, c) = hlc(table)?;
            let out = oscillator::calculate_stochastic(h, l, c, period, smooth);
            vec![out.k, out.d]
        }
        IndicatorType::Cci(w) => {
            let (h, l, c) = hlc(table)?;
            vec![oscillator::calculate_cci(h, l, c, w)]
        }
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        } => {
            let out = bollinger::calculate_bollinger(table.column(CLOSE)?, period, stddev_mult_x100);
            vec![out.upper, out.lower, out.middle, out.width]
        }
        IndicatorType::Atr(w) => {
            let (h, l, c) = hlc(table)?;
            vec![atr::calculate_atr(h, l, c, w)]
        }
        IndicatorType::Obv => vec![obv::calculate_obv(
            table.column(CLOSE)?,
            table.column(VOLUME)?,
        )],
        IndicatorType::VolumeOscillator { short, long } => vec![
            volume::calculate_volume_oscillator(table.column(VOLUME)?, short, long),
        ],
        IndicatorType::Cmf(w) => {
            let (h, l, c) = hlc(table)?;
            vec![volume::calculate_cmf(h, l, c, table.column(VOLUME)?, w)]
        }
        IndicatorType::Ichimoku {
            conversion,
            base,
            span_b,
        } => {
            let out = ichimoku::calculate_ichimoku(
                table.column(HIGH)?,
                table.column(LOW)?,
                conversion,
                base,
                span_b,
            );
            vec![out.span_a, out.span_b, out.base_line, out.conversion_line]
        }
        IndicatorType::HeikinAshi => {
            let (h, l, c) = hlc(table)?;
            let out = heikin_ashi::calculate_heikin_ashi(table.column(OPEN)?, h, l, c);
            vec![out.open, out.high, out.low, out.close]
        }
        IndicatorType::Fibonacci { lookback } => {
            let found = levels::fibonacci_levels(table.column(HIGH)?, table.column(LOW)?, lookback);
            match found {
                Some(found) => found
                    .iter()
                    .map(|level| vec![level.price; table.len()])
                    .collect(),
                None => vec![vec![f64::NAN; table.len()]; levels::FIB_RATIOS.len()],
            }
        }
        IndicatorType::Pivot => {
            let (h, l, c) = hlc(table)?;
            let out = levels::calculate_pivots(h, l, c);
            vec![out.pivot, out.r1, out.s1, out.r2, out.s2]
        }
        IndicatorType::Adx(w) => {
            let (h, l, c) = hlc(table)?;
            vec![adx::calculate_adx(h, l, c, w)]
        }
        IndicatorType::WilliamsR(w) => {
            let (h, l, c) = hlc(table)?;
            vec![oscillator::calculate_williams_r(h, l, c, w)]
        }
    };

    Ok(indicator
        .column_names()
        .into_iter()
        .zip(values)
        .map(|(name, values)| Column::new(name, values))
        .collect())
}

/// Resolve `name` with `params` (defaults for absent keys) and derive its columns.
pub fn compute_indicator(
    table: &PriceTable,
    name: &str,
    params: &ParamSet,
) -> Result<Vec<Column>, CoinlabError> {
    let indicator = IndicatorKind::from_name(name)?.build(params);
    compute(table, &indicator)
}

/// Derive the columns of `indicator` and append them to `table`.
pub fn apply_indicator(table: &mut PriceTable, indicator: &IndicatorType) -> Result<(), CoinlabError> {
    let columns = compute(table, indicator)?;
    table.extend_columns(columns)
}

fn hlc(table: &PriceTable) -> Result<(&[f64], &[f64], &[f64]), CoinlabError> {
    Ok((table.column(HIGH)?, table.column(LOW)?, table.column(CLOSE)?))
}
