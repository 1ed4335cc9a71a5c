//! Property tests for the backtest and optimizer invariants.

mod common;

use common::*;
use coinlab::domain::backtest::simulate;
use coinlab::domain::indicator::compute_indicator;
use coinlab::domain::params::{ParamRanges, ParamSet, parse_range_expr};
use coinlab::domain::optimizer::{grid_search, random_search};
use coinlab::domain::signal::Signal;
use proptest::prelude::*;

fn closes_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..1000.0, min..max)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn no_buy_signal_means_no_profit(
        closes in closes_strategy(1, 60),
        balance in 0.0f64..1e6,
        sell_mask in prop::collection::vec(any::<bool>(), 60),
    ) {
        let signals: Vec<Signal> = closes
            .iter()
            .enumerate()
            .map(|(i, _)| if sell_mask[i] { Signal::Sell } else { Signal::Flat })
            .collect();
        let result = simulate(&closes, &signals, balance).unwrap();
        prop_assert_eq!(result.profit, 0.0);
        prop_assert_eq!(result.final_balance, balance);
        prop_assert!(result.trades.is_empty());
    }

    #[test]
    fn profit_is_sum_of_trade_pnl(
        closes in closes_strategy(2, 60),
        raw in prop::collection::vec(-1i8..=1, 60),
    ) {
        let signals: Vec<Signal> = raw[..closes.len()].iter().map(|&s| Signal::from(s)).collect();
        let result = simulate(&closes, &signals, 1000.0).unwrap();
        let total: f64 = result.trades.iter().map(|t| t.pnl).sum();
        prop_assert!((result.profit - total).abs() < 1e-6);
        prop_assert!((result.final_balance - (1000.0 + result.profit)).abs() < 1e-6);
    }

    #[test]
    fn sma_is_defined_from_window_end(closes in closes_strategy(1, 50), window in 1usize..20) {
        let table = table_from_closes(&closes);
        let cols = compute_indicator(&table, "SMA", &ParamSet::new().with("SMA", window)).unwrap();
        let sma = &cols[0].values;
        prop_assert_eq!(sma.len(), closes.len());
        for (t, v) in sma.iter().enumerate() {
            prop_assert_eq!(v.is_nan(), t + 1 < window);
        }
    }

    #[test]
    fn grid_covers_cartesian_product(
        sma in prop::collection::btree_set(2usize..15, 1..4),
        ema in prop::collection::btree_set(2usize..15, 1..3),
    ) {
        let table = table_from_closes(&wave_closes(40));
        let ranges = ParamRanges::new()
            .with("SMA", sma.iter().copied())
            .with("EMA", ema.iter().copied());
        let result = grid_search(&table, ["SMA", "EMA"], &ranges).unwrap();

        prop_assert_eq!(result.trials.len(), sma.len() * ema.len());
        let best = result.best_score().unwrap();
        prop_assert!(result.trials.iter().all(|t| t.score <= best));
    }

    #[test]
    fn random_search_samples_declared_values(
        values in prop::collection::btree_set(2usize..30, 1..6),
        n_iter in 0usize..20,
        seed in any::<u64>(),
    ) {
        let table = table_from_closes(&wave_closes(40));
        let ranges = ParamRanges::new().with("RSI", values.iter().copied());
        let result = random_search(&table, ["RSI"], &ranges, n_iter, Some(seed)).unwrap();

        prop_assert_eq!(result.trials.len(), n_iter);
        prop_assert_eq!(result.best.is_none(), n_iter == 0);
        for trial in &result.trials {
            prop_assert!(values.contains(&trial.params.get("RSI").unwrap()));
        }
    }

    #[test]
    fn inclusive_range_bounds(start in 1usize..50, len in 0usize..50, step in 1usize..10) {
        let end = start + len;
        let values = parse_range_expr(&format!("{}..={}:{}", start, end, step)).unwrap();
        prop_assert_eq!(values[0], start);
        prop_assert!(*values.last().unwrap() <= end);
        prop_assert_eq!(values.len(), len / step + 1);
    }
}
