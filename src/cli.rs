//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{BacktestResult, DEFAULT_INITIAL_BALANCE, run_backtest};
use crate::domain::config_validation::{OptimizerConfig, validate_optimizer_config};
use crate::domain::error::CoinlabError;
use crate::domain::indicator::{IndicatorKind, apply_indicator};
use crate::domain::metrics::Metric;
use crate::domain::optimizer::{
    DEFAULT_RANDOM_ITERATIONS, ParameterOptimizer, SearchStrategy, default_search_space,
};
use crate::domain::params::{ParamSet, parse_range_expr};
use crate::domain::signal::{Signal, crossover_signals, naive_signals, resolve_signal_column};
use crate::domain::summary::technical_summary;
use crate::domain::table::{CLOSE, PriceTable};
use crate::domain::universe::{MIN_BARS, SymbolMap, parse_coins, validate_universe};
use crate::ports::data_port::DataPort;
use crate::ports::report_port::{ReportPort, SummaryRow};

const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "coinlab", about = "Crypto indicator research, backtesting and parameter search")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute indicator columns for a symbol
    Indicators {
        #[arg(short, long)]
        symbol: String,
        /// Indicator name, repeatable (e.g. SMA, "Bollinger Bands")
        #[arg(short, long = "indicator", required = true)]
        indicators: Vec<String>,
        /// Parameter override KEY=VALUE, repeatable
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, usize)>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Rows to print when no output file is given
        #[arg(long, default_value_t = 5)]
        tail: usize,
    },
    /// Backtest one indicator's signals on a symbol
    Backtest {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        indicator: String,
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, usize)>,
        /// naive (indicator above close) or crossover (close vs indicator)
        #[arg(long, default_value = "naive")]
        rule: String,
        #[arg(long, default_value_t = DEFAULT_INITIAL_BALANCE)]
        initial_balance: f64,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Search indicator parameters for one symbol
    Optimize {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        symbol: Option<String>,
        #[arg(short, long = "indicator")]
        indicators: Vec<String>,
        /// Parameter range KEY=EXPR, repeatable (e.g. SMA=10,20,50 or RSI=5..=21)
        #[arg(short, long = "range", value_parser = parse_range)]
        ranges: Vec<(String, Vec<usize>)>,
        /// grid or random
        #[arg(long)]
        strategy: Option<String>,
        #[arg(long)]
        n_iter: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        metric: Option<String>,
        #[arg(long)]
        initial_balance: Option<f64>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Write every trial to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Grid and random search for every tunable indicator across coins
    OptimizeAll {
        /// Comma-separated coin list; defaults to the Tier1 universe
        #[arg(long)]
        coins: Option<String>,
        #[arg(long, default_value_t = DEFAULT_RANDOM_ITERATIONS)]
        n_iter: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List close-vs-SMA crossover signals for a symbol
    Signals {
        #[arg(short, long)]
        symbol: String,
        #[arg(long, default_value_t = 20)]
        sma: usize,
        #[arg(long, default_value_t = 10)]
        tail: usize,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// RSI, moving-average and Bollinger verdicts for the latest bar
    Summary {
        #[arg(long)]
        coins: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// List tickers available in the data directory
    Tickers {
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Validate an optimizer configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Indicators {
            symbol,
            indicators,
            params,
            data_dir,
            output,
            tail,
        } => run_indicators(
            &symbol,
            &indicators,
            params,
            data_dir.as_deref(),
            output.as_deref(),
            tail,
        ),
        Command::Backtest {
            symbol,
            indicator,
            params,
            rule,
            initial_balance,
            data_dir,
        } => run_single_backtest(
            &symbol,
            &indicator,
            params,
            &rule,
            initial_balance,
            data_dir.as_deref(),
        ),
        Command::Optimize {
            config,
            symbol,
            indicators,
            ranges,
            strategy,
            n_iter,
            seed,
            metric,
            initial_balance,
            data_dir,
            output,
        } => {
            let overrides = OptimizeOverrides {
                symbol,
                indicators,
                ranges,
                strategy,
                n_iter,
                seed,
                metric,
                initial_balance,
                data_dir,
            };
            run_optimize(config.as_deref(), overrides, output.as_deref())
        }
        Command::OptimizeAll {
            coins,
            n_iter,
            seed,
            data_dir,
            output,
        } => run_optimize_all(
            coins.as_deref(),
            n_iter,
            seed,
            data_dir.as_deref(),
            output.as_deref(),
        ),
        Command::Signals {
            symbol,
            sma,
            tail,
            data_dir,
        } => run_signals(&symbol, sma, tail, data_dir.as_deref()),
        Command::Summary { coins, data_dir } => run_summary(coins.as_deref(), data_dir.as_deref()),
        Command::Tickers { data_dir } => run_tickers(data_dir.as_deref()),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn parse_param(s: &str) -> Result<(String, usize), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let value = value
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid value for {}: '{}'", key.trim(), value.trim()))?;
    Ok((key.trim().to_string(), value))
}

pub fn parse_range(s: &str) -> Result<(String, Vec<usize>), String> {
    let (key, expr) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=EXPR, got '{}'", s))?;
    Ok((key.trim().to_string(), parse_range_expr(expr)?))
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, CoinlabError> {
    FileConfigAdapter::from_file(path)
}

/// A symbol containing `-` is taken as a ticker; otherwise it is a coin
/// looked up in `symbols`.
pub fn resolve_ticker(symbols: &SymbolMap, symbol: &str) -> String {
    if symbol.contains('-') {
        symbol.to_string()
    } else {
        symbols.resolve(symbol)
    }
}

fn data_adapter(data_dir: Option<&Path>) -> CsvAdapter {
    CsvAdapter::new(
        data_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
    )
}

fn fetch(data_port: &dyn DataPort, symbol: &str) -> Result<(String, PriceTable), CoinlabError> {
    let ticker = resolve_ticker(&SymbolMap::tier1(), symbol);
    let table = data_port.fetch_series(&ticker)?;
    info!(%ticker, rows = table.len(), "Loaded price series");
    Ok((ticker, table))
}

fn path_str(path: &Path) -> String {
    path.display().to_string()
}

fn run_indicators(
    symbol: &str,
    indicators: &[String],
    params: Vec<(String, usize)>,
    data_dir: Option<&Path>,
    output: Option<&Path>,
    tail: usize,
) -> Result<(), CoinlabError> {
    let (ticker, mut table) = fetch(&data_adapter(data_dir), symbol)?;
    let params: ParamSet = params.into_iter().collect();

    for name in indicators {
        let indicator = IndicatorKind::from_name(name)?.build(&params);
        apply_indicator(&mut table, &indicator)?;
        info!(%indicator, "Applied indicator");
    }

    match output {
        Some(path) => {
            CsvReportAdapter::new().write_table(&table, &path_str(path))?;
            eprintln!("Wrote {} rows for {} to {}", table.len(), ticker, path.display());
        }
        None => print_tail(&table, tail),
    }
    Ok(())
}

fn print_tail(table: &PriceTable, tail: usize) {
    let names = table.column_names();
    println!("Date,{}", names.join(","));
    let start = table.len().saturating_sub(tail);
    for row in start..table.len() {
        let values: Vec<String> = names
            .iter()
            .map(|name| match table.value(name, row) {
                Some(v) if !v.is_nan() => format!("{:.4}", v),
                _ => String::new(),
            })
            .collect();
        println!("{},{}", table.index()[row].format("%Y-%m-%d"), values.join(","));
    }
}

fn run_single_backtest(
    symbol: &str,
    indicator_name: &str,
    params: Vec<(String, usize)>,
    rule: &str,
    initial_balance: f64,
    data_dir: Option<&Path>,
) -> Result<(), CoinlabError> {
    let kind = IndicatorKind::from_name(indicator_name)?;
    if !kind.has_signal_column() {
        return Err(CoinlabError::Configuration {
            reason: format!("{} has no signal column to backtest", kind),
        });
    }
    let (ticker, mut table) = fetch(&data_adapter(data_dir), symbol)?;

    // Fill every declared key so the signal column can be resolved.
    let mut params: ParamSet = params.into_iter().collect();
    for spec in kind.params() {
        if !params.contains(spec.key) {
            params.insert(spec.key, spec.default);
        }
    }

    let indicator = kind.build(&params);
    apply_indicator(&mut table, &indicator)?;
    let column = resolve_signal_column(&table, &params)?;
    let closes = table.column(CLOSE)?;
    let values = table.column(&column)?;

    let signals = match rule.to_ascii_lowercase().as_str() {
        "naive" => naive_signals(values, closes),
        "crossover" => crossover_signals(closes, values),
        other => {
            return Err(CoinlabError::Configuration {
                reason: format!("unknown signal rule '{}', expected naive or crossover", other),
            });
        }
    };

    let result = run_backtest(&table, &signals, initial_balance)?;
    println!("{} {} on {} ({} rule)", ticker, indicator, column, rule);
    print_backtest(&result);
    Ok(())
}

fn print_backtest(result: &BacktestResult) {
    println!("Initial balance: {:.2}", result.initial_balance);
    println!("Final balance:   {:.2}", result.final_balance);
    println!("Profit:          {:.2}", result.profit);
    println!("Return:          {:.2}%", result.return_pct());
    println!("Trades:          {}", result.trade_count());
    println!("Win rate:        {:.1}%", result.win_rate() * 100.0);
    for trade in &result.trades {
        let date = |t: Option<chrono::NaiveDateTime>| {
            t.map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        };
        println!(
            "  {} @ {:.4} -> {} @ {:.4}  pnl {:.4}",
            date(trade.entry_time),
            trade.entry_price,
            date(trade.exit_time),
            trade.exit_price,
            trade.pnl
        );
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct OptimizeOverrides {
    pub symbol: Option<String>,
    pub indicators: Vec<String>,
    pub ranges: Vec<(String, Vec<usize>)>,
    pub strategy: Option<String>,
    pub n_iter: Option<usize>,
    pub seed: Option<u64>,
    pub metric: Option<String>,
    pub initial_balance: Option<f64>,
    pub data_dir: Option<PathBuf>,
}

/// Merge the config file (if any) with command-line overrides.
pub fn build_optimizer_config(
    config_path: Option<&Path>,
    overrides: OptimizeOverrides,
) -> Result<(OptimizerConfig, PathBuf), CoinlabError> {
    let mut config = match config_path {
        Some(path) => OptimizerConfig::from_config(&load_config(path)?)?,
        None => OptimizerConfig::from_config(&FileConfigAdapter::from_string("")?)?,
    };

    if let Some(symbol) = overrides.symbol {
        config.symbol = Some(symbol);
    }
    if !overrides.indicators.is_empty() {
        config.indicators = overrides.indicators;
    }
    for (key, values) in overrides.ranges {
        config.ranges.insert(key, values);
    }
    if let Some(metric) = overrides.metric {
        config.metric = metric.parse::<Metric>().map_err(|e| CoinlabError::Configuration {
            reason: e.to_string(),
        })?;
    }
    if let Some(balance) = overrides.initial_balance {
        config.initial_balance = balance;
    }

    let (current_n, current_seed) = match config.strategy {
        SearchStrategy::Random { n_iter, seed } => (n_iter, seed),
        SearchStrategy::Grid => (DEFAULT_RANDOM_ITERATIONS, None),
    };
    let strategy_name = overrides.strategy.map(|s| s.to_ascii_lowercase());
    let random = match strategy_name.as_deref() {
        Some("grid") => false,
        Some("random") => true,
        Some(other) => {
            return Err(CoinlabError::Configuration {
                reason: format!("unknown strategy '{}', expected grid or random", other),
            });
        }
        None => matches!(config.strategy, SearchStrategy::Random { .. }),
    };
    config.strategy = if random {
        SearchStrategy::Random {
            n_iter: overrides.n_iter.unwrap_or(current_n),
            seed: overrides.seed.or(current_seed),
        }
    } else {
        SearchStrategy::Grid
    };

    if config.indicators.is_empty() {
        return Err(CoinlabError::Configuration {
            reason: "no indicators to optimize".into(),
        });
    }

    let data_dir = overrides
        .data_dir
        .or_else(|| config.data_dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    Ok((config, data_dir))
}

fn run_optimize(
    config_path: Option<&Path>,
    overrides: OptimizeOverrides,
    output: Option<&Path>,
) -> Result<(), CoinlabError> {
    let (config, data_dir) = build_optimizer_config(config_path, overrides)?;
    let symbol = config.symbol.clone().ok_or_else(|| CoinlabError::ConfigMissing {
        section: "data".into(),
        key: "symbol".into(),
    })?;

    let (ticker, table) = fetch(&CsvAdapter::new(data_dir), &symbol)?;
    let optimizer = ParameterOptimizer::new(&config.indicators, config.ranges.clone(), table)?
        .with_metric(config.metric)
        .with_initial_balance(config.initial_balance);

    let result = optimizer.search(config.strategy)?;

    println!(
        "{} {} search over [{}], metric {}",
        ticker,
        config.strategy,
        config.indicators.join(", "),
        config.metric
    );
    println!("Trials: {} ({} failed)", result.trials.len(), result.failed_trials());
    match (result.best_params(), result.best_score()) {
        (Some(params), Some(score)) => {
            println!("Best params: {}", params);
            println!("Best score:  {}", score);
        }
        _ => println!("No trials evaluated"),
    }

    if let Some(path) = output {
        CsvReportAdapter::new().write_trials(&result, &path_str(path))?;
        eprintln!("Trials written to {}", path.display());
    }
    Ok(())
}

fn run_optimize_all(
    coins: Option<&str>,
    n_iter: usize,
    seed: Option<u64>,
    data_dir: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), CoinlabError> {
    let symbols = SymbolMap::tier1();
    let coins = match coins {
        Some(list) => parse_coins(list)?,
        None => symbols.coins().map(str::to_string).collect(),
    };

    let adapter = data_adapter(data_dir);
    let universe = validate_universe(&adapter, &symbols, coins, MIN_BARS)?;
    info!(
        valid = universe.valid.len(),
        skipped = universe.skipped.len(),
        "Universe validated"
    );

    let mut rows = Vec::new();
    for (coin, ticker) in &universe.valid {
        let table = adapter.fetch_series(ticker)?;
        for (kind, ranges) in default_search_space() {
            let optimizer = ParameterOptimizer::new([kind.name()], ranges, table.clone())?;
            let grid = optimizer.grid_search()?;
            let random = optimizer.random_search(n_iter, seed)?;

            println!(
                "{:<6} {:<16} grid {} = {}  random {} = {}",
                coin,
                kind.name(),
                grid.best_params().map(|p| p.to_string()).unwrap_or_default(),
                grid.best_score().unwrap_or(0.0),
                random.best_params().map(|p| p.to_string()).unwrap_or_default(),
                random.best_score().unwrap_or(0.0),
            );
            rows.push(SummaryRow {
                label: format!("{} {}", coin, kind.name()),
                grid,
                random: Some(random),
            });
        }
    }

    if let Some(path) = output {
        CsvReportAdapter::new().write_summary(&rows, &path_str(path))?;
        eprintln!("Summary written to {}", path.display());
    }
    Ok(())
}

fn run_signals(
    symbol: &str,
    sma: usize,
    tail: usize,
    data_dir: Option<&Path>,
) -> Result<(), CoinlabError> {
    let (ticker, mut table) = fetch(&data_adapter(data_dir), symbol)?;
    let indicator = IndicatorKind::Sma.build(&ParamSet::new().with("SMA", sma));
    apply_indicator(&mut table, &indicator)?;

    let column = format!("SMA_{}", sma);
    let closes = table.column(CLOSE)?;
    let values = table.column(&column)?;
    let signals = crossover_signals(closes, values);

    let active: Vec<usize> = (0..signals.len())
        .filter(|&i| signals[i] != Signal::Flat)
        .collect();
    let start = active.len().saturating_sub(tail);

    println!("{} close vs {}", ticker, column);
    println!("Date,Close,{},Signal", column);
    for &i in &active[start..] {
        println!(
            "{},{:.4},{:.4},{}",
            table.index()[i].format("%Y-%m-%d"),
            closes[i],
            values[i],
            signals[i]
        );
    }
    eprintln!("{} active signals, showing {}", active.len(), active.len() - start);
    Ok(())
}

fn run_summary(coins: Option<&str>, data_dir: Option<&Path>) -> Result<(), CoinlabError> {
    let symbols = SymbolMap::tier1();
    let coins = match coins {
        Some(list) => parse_coins(list)?,
        None => symbols.coins().map(str::to_string).collect(),
    };
    let adapter = data_adapter(data_dir);

    println!("Coin,Price,RSI,MA,BB,Recommendation");
    for coin in coins {
        let ticker = symbols.resolve(&coin);
        let table = match adapter.fetch_series(&ticker) {
            Ok(table) => table,
            Err(e) => {
                warn!(%coin, error = %e, "Skipping coin");
                continue;
            }
        };
        match technical_summary(&table) {
            Ok(summary) => println!(
                "{},{:.4},{},{},{},{}",
                coin,
                summary.price,
                summary.rsi_signal,
                summary.ma_signal,
                summary.bb_signal,
                summary.recommendation
            ),
            Err(e) => warn!(%coin, error = %e, "No summary"),
        }
    }
    Ok(())
}

fn run_tickers(data_dir: Option<&Path>) -> Result<(), CoinlabError> {
    let symbols = SymbolMap::tier1();
    for ticker in data_adapter(data_dir).list_tickers()? {
        let tier1 = symbols.coins().any(|coin| symbols.resolve(coin) == ticker);
        println!("{}{}", ticker, if tier1 { " (tier1)" } else { "" });
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), CoinlabError> {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = load_config(config_path)?;
    validate_optimizer_config(&adapter)?;

    let config = OptimizerConfig::from_config(&adapter)?;
    eprintln!("  Strategy:   {}", config.strategy);
    eprintln!("  Metric:     {}", config.metric);
    eprintln!("  Indicators: {}", config.indicators.join(", "));
    for axis in config.ranges.axes() {
        eprintln!("  Range {}: {:?}", axis.key, axis.values);
    }
    if config.strategy == SearchStrategy::Grid {
        eprintln!("  Combinations: {}", config.ranges.combination_count()?);
    }

    if !config.indicators.is_empty() {
        // Construct against an empty table to run the optimizer's own checks.
        ParameterOptimizer::new(&config.indicators, config.ranges.clone(), PriceTable::default())?;
    }

    eprintln!("\nConfiguration is valid.");
    Ok(())
}
