//! Grid and random search over indicator parameters.
//!
//! Each trial clones the working table, applies every configured indicator
//! with the trial's parameters, and hands the enriched table to a
//! [`Scorer`]. The best trial is the first one with the strictly highest
//! score, in evaluation order.
//!
//! Configuration problems (unknown indicator, missing parameter axis, empty
//! candidate list) fail in [`ParameterOptimizer::new`] before any trial
//! runs. Data problems inside a trial (missing column, invalid window) give
//! that trial a score of 0 and are recorded on the [`Trial`].

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::domain::backtest::{DEFAULT_INITIAL_BALANCE, run_backtest};
use crate::domain::error::CoinlabError;
use crate::domain::indicator::{IndicatorKind, apply_indicator};
use crate::domain::metrics::Metric;
use crate::domain::params::{ParamRanges, ParamSet};
use crate::domain::signal::{naive_signals, resolve_signal_column};
use crate::domain::table::{CLOSE, PriceTable};

pub const DEFAULT_RANDOM_ITERATIONS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    Grid,
    Random { n_iter: usize, seed: Option<u64> },
}

impl std::fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchStrategy::Grid => write!(f, "grid"),
            SearchStrategy::Random { n_iter, .. } => write!(f, "random({})", n_iter),
        }
    }
}

/// Scores one trial: the table already carries the trial's indicator columns.
pub trait Scorer: Send + Sync {
    fn score(&self, table: &PriceTable, params: &ParamSet) -> Result<f64, CoinlabError>;
}

impl<F> Scorer for F
where
    F: Fn(&PriceTable, &ParamSet) -> Result<f64, CoinlabError> + Send + Sync,
{
    fn score(&self, table: &PriceTable, params: &ParamSet) -> Result<f64, CoinlabError> {
        self(table, params)
    }
}

/// Backtests the naive "indicator above close" rule and reports `metric`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NaiveSignalScorer {
    pub metric: Metric,
    pub initial_balance: f64,
}

impl Default for NaiveSignalScorer {
    fn default() -> Self {
        Self {
            metric: Metric::Profit,
            initial_balance: DEFAULT_INITIAL_BALANCE,
        }
    }
}

impl Scorer for NaiveSignalScorer {
    fn score(&self, table: &PriceTable, params: &ParamSet) -> Result<f64, CoinlabError> {
        let column = resolve_signal_column(table, params)?;
        let signals = naive_signals(table.column(&column)?, table.column(CLOSE)?);
        let result = run_backtest(table, &signals, self.initial_balance)?;
        Ok(self.metric.score(&result))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    pub params: ParamSet,
    pub score: f64,
    /// Why the trial was scored 0 instead of evaluated.
    pub failure: Option<String>,
}

impl Trial {
    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OptimizationResult {
    pub trials: Vec<Trial>,
    pub best: Option<usize>,
}

impl OptimizationResult {
    fn from_trials(trials: Vec<Trial>) -> Self {
        let mut best: Option<usize> = None;
        for (i, trial) in trials.iter().enumerate() {
            match best {
                Some(b) if trial.score <= trials[b].score => {}
                _ => best = Some(i),
            }
        }
        Self { trials, best }
    }

    pub fn best_trial(&self) -> Option<&Trial> {
        self.best.and_then(|i| self.trials.get(i))
    }

    pub fn best_params(&self) -> Option<&ParamSet> {
        self.best_trial().map(|t| &t.params)
    }

    pub fn best_score(&self) -> Option<f64> {
        self.best_trial().map(|t| t.score)
    }

    pub fn failed_trials(&self) -> usize {
        self.trials.iter().filter(|t| t.is_failure()).count()
    }
}

pub struct ParameterOptimizer {
    indicators: Vec<IndicatorKind>,
    ranges: ParamRanges,
    table: PriceTable,
    scorer: Option<Box<dyn Scorer>>,
    metric: Metric,
    initial_balance: f64,
}

impl std::fmt::Debug for ParameterOptimizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterOptimizer")
            .field("indicators", &self.indicators)
            .field("ranges", &self.ranges)
            .field("rows", &self.table.len())
            .field("custom_scorer", &self.scorer.is_some())
            .field("metric", &self.metric)
            .field("initial_balance", &self.initial_balance)
            .finish()
    }
}

impl ParameterOptimizer {
    pub fn new<I, S>(indicators: I, ranges: ParamRanges, table: PriceTable) -> Result<Self, CoinlabError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let indicators = indicators
            .into_iter()
            .map(|name| IndicatorKind::from_name(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        for axis in ranges.axes() {
            if axis.values.is_empty() {
                return Err(CoinlabError::Configuration {
                    reason: format!("parameter {} has no candidate values", axis.key),
                });
            }
        }

        for kind in &indicators {
            for spec in kind.params().iter().filter(|spec| spec.required) {
                if !ranges.contains(spec.key) {
                    return Err(CoinlabError::Configuration {
                        reason: format!("{} requires a range for parameter {}", kind, spec.key),
                    });
                }
            }
        }

        Ok(Self {
            indicators,
            ranges,
            table,
            scorer: None,
            metric: Metric::default(),
            initial_balance: DEFAULT_INITIAL_BALANCE,
        })
    }

    pub fn with_scorer(mut self, scorer: impl Scorer + 'static) -> Self {
        self.scorer = Some(Box::new(scorer));
        self
    }

    /// Metric reported by the default scorer.
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_initial_balance(mut self, initial_balance: f64) -> Self {
        self.initial_balance = initial_balance;
        self
    }

    pub fn indicators(&self) -> &[IndicatorKind] {
        &self.indicators
    }

    pub fn ranges(&self) -> &ParamRanges {
        &self.ranges
    }

    /// Evaluate every combination, first axis outermost.
    pub fn grid_search(&self) -> Result<OptimizationResult, CoinlabError> {
        let candidates = self.ranges.combinations()?;
        info!(
            combinations = candidates.len(),
            indicators = self.indicators.len(),
            "Starting grid search"
        );
        self.run(candidates)
    }

    /// Evaluate `n_iter` parameter sets, each key sampled uniformly from its
    /// candidates. Duplicates are evaluated again. A seed makes the sequence
    /// reproducible.
    pub fn random_search(
        &self,
        n_iter: usize,
        seed: Option<u64>,
    ) -> Result<OptimizationResult, CoinlabError> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let candidates: Vec<ParamSet> = (0..n_iter)
            .map(|_| {
                self.ranges
                    .axes()
                    .iter()
                    .filter_map(|axis| axis.values.choose(&mut rng).map(|&v| (axis.key.clone(), v)))
                    .collect()
            })
            .collect();

        info!(iterations = n_iter, ?seed, "Starting random search");
        self.run(candidates)
    }

    pub fn search(&self, strategy: SearchStrategy) -> Result<OptimizationResult, CoinlabError> {
        match strategy {
            SearchStrategy::Grid => self.grid_search(),
            SearchStrategy::Random { n_iter, seed } => self.random_search(n_iter, seed),
        }
    }

    /// Score a single parameter set.
    pub fn evaluate(&self, params: ParamSet) -> Result<Trial, CoinlabError> {
        let outcome = self.score_params(&params);
        let trial = match outcome {
            Ok(score) if score.is_nan() => {
                warn!(%params, "Trial produced an undefined score");
                Trial {
                    params,
                    score: 0.0,
                    failure: Some("score is NaN".into()),
                }
            }
            Ok(score) => {
                debug!(%params, score, "Trial evaluated");
                Trial {
                    params,
                    score,
                    failure: None,
                }
            }
            Err(err) if err.is_trial_local() => {
                warn!(%params, error = %err, "Trial failed, scoring 0");
                Trial {
                    params,
                    score: 0.0,
                    failure: Some(err.to_string()),
                }
            }
            Err(err) => return Err(err),
        };
        Ok(trial)
    }

    fn score_params(&self, params: &ParamSet) -> Result<f64, CoinlabError> {
        let mut working = self.table.clone();
        for kind in &self.indicators {
            apply_indicator(&mut working, &kind.build(params))?;
        }

        match &self.scorer {
            Some(scorer) => scorer.score(&working, params),
            None => NaiveSignalScorer {
                metric: self.metric,
                initial_balance: self.initial_balance,
            }
            .score(&working, params),
        }
    }

    fn run(&self, candidates: Vec<ParamSet>) -> Result<OptimizationResult, CoinlabError> {
        let trials = self.evaluate_all(candidates)?;
        let result = OptimizationResult::from_trials(trials);

        if let Some(best) = result.best_trial() {
            info!(
                trials = result.trials.len(),
                failed = result.failed_trials(),
                best_params = %best.params,
                best_score = best.score,
                "Search complete"
            );
        }
        Ok(result)
    }

    #[cfg(not(feature = "parallel"))]
    fn evaluate_all(&self, candidates: Vec<ParamSet>) -> Result<Vec<Trial>, CoinlabError> {
        candidates.into_iter().map(|p| self.evaluate(p)).collect()
    }

    // Order of the collected trials matches the candidate order.
    #[cfg(feature = "parallel")]
    fn evaluate_all(&self, candidates: Vec<ParamSet>) -> Result<Vec<Trial>, CoinlabError> {
        use rayon::prelude::*;
        candidates.into_par_iter().map(|p| self.evaluate(p)).collect()
    }
}

/// Grid search with the default scorer.
pub fn grid_search<I, S>(
    table: &PriceTable,
    indicators: I,
    ranges: &ParamRanges,
) -> Result<OptimizationResult, CoinlabError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ParameterOptimizer::new(indicators, ranges.clone(), table.clone())?.grid_search()
}

/// Random search with the default scorer.
pub fn random_search<I, S>(
    table: &PriceTable,
    indicators: I,
    ranges: &ParamRanges,
    n_iter: usize,
    seed: Option<u64>,
) -> Result<OptimizationResult, CoinlabError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ParameterOptimizer::new(indicators, ranges.clone(), table.clone())?.random_search(n_iter, seed)
}

/// Per-indicator candidate ranges used when optimizing every tunable
/// indicator in turn.
pub fn default_search_space() -> Vec<(IndicatorKind, ParamRanges)> {
    let short = [7, 14, 21];
    vec![
        (IndicatorKind::Sma, ParamRanges::new().with("SMA", [5, 10, 20, 50, 100])),
        (IndicatorKind::Ema, ParamRanges::new().with("EMA", [5, 10, 20, 50, 100])),
        (IndicatorKind::Rsi, ParamRanges::new().with("RSI", short)),
        (
            IndicatorKind::Macd,
            ParamRanges::new()
                .with("MACD_fast", [7, 12])
                .with("MACD_slow", [21, 26]),
        ),
        (IndicatorKind::Bollinger, ParamRanges::new().with("BB", [10, 20, 50])),
        (IndicatorKind::Atr, ParamRanges::new().with("ATR", short)),
        (IndicatorKind::Cci, ParamRanges::new().with("CCI", short)),
        (IndicatorKind::Stochastic, ParamRanges::new().with("Stochastic", short)),
        (IndicatorKind::Adx, ParamRanges::new().with("ADX", short)),
        (IndicatorKind::WilliamsR, ParamRanges::new().with("WilliamsR", short)),
    ]
}
