//! CLI definition and dispatch.

use chrono::{Duration, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_chain_adapter::JsonChainAdapter;
use crate::adapters::json_sentiment_adapter::JsonSentimentAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    parse_optional_date, validate_backtest_config, validate_data_config, validate_options_config,
};
use crate::domain::error::ScoutError;
use crate::domain::indicator_helpers::{build_frame, IndicatorFrame};
use crate::domain::metrics::Metrics;
use crate::domain::selection::{self, EmptyReason, Selection, SelectionConfig};
use crate::domain::sentiment::{effective_sentiment, SentimentSignal};
use crate::domain::signal::{generate_directive, Directive};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::option_chain_port::OptionChainPort;
use crate::ports::report_port::ReportPort;
use crate::ports::sentiment_port::{collect_signals, SentimentPort};

/// Calendar days of history fed to the indicators when analysing.
pub const ANALYSIS_LOOKBACK_DAYS: i64 = 365;

#[derive(Parser, Debug)]
#[command(
    name = "optscout",
    about = "Options directive scout and strategy backtester"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Suggest a directive and option contracts
    Analyze {
        /// Symbol or comma-separated list of symbols
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        config: PathBuf,
        /// Evaluate as of this date (YYYY-MM-DD); defaults to the latest bar
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Override [options] max_cost
        #[arg(long)]
        max_cost: Option<f64>,
        /// Ignore sentiment providers
        #[arg(long)]
        no_sentiment: bool,
    },
    /// Replay the technical strategy over price history
    Backtest {
        #[arg(short, long)]
        symbol: Option<String>,
        #[arg(short, long)]
        config: PathBuf,
        /// Directory for trades.csv, equity.csv and summary.csv
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols with price data
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze {
            symbol,
            config,
            as_of,
            max_cost,
            no_sentiment,
        } => run_analyze(&config, &symbol, as_of, max_cost, !no_sentiment),
        Command::Backtest {
            symbol,
            config,
            output,
        } => run_backtest(&config, symbol.as_deref(), output.as_ref()),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
    }
}

fn fail(e: &ScoutError) -> ExitCode {
    eprintln!("error: {e}");
    e.into()
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    log::info!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

pub fn data_dir(adapter: &dyn ConfigPort) -> Result<PathBuf, ScoutError> {
    validate_data_config(adapter)?;
    let dir = adapter.get_string("data", "dir").unwrap_or_default();
    Ok(PathBuf::from(dir.trim()))
}

pub fn build_selection_config(adapter: &dyn ConfigPort) -> SelectionConfig {
    let defaults = SelectionConfig::default();
    SelectionConfig {
        max_cost: adapter.get_double("options", "max_cost", defaults.max_cost),
        risk_free_rate: adapter.get_double("options", "risk_free_rate", defaults.risk_free_rate),
        min_abs_delta: adapter.get_double("options", "min_abs_delta", defaults.min_abs_delta),
        proximity_band: adapter.get_double("options", "proximity_band", defaults.proximity_band),
        max_results: usize::try_from(adapter.get_int(
            "options",
            "max_results",
            defaults.max_results as i64,
        ))
        .unwrap_or(defaults.max_results),
    }
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> BacktestConfig {
    let defaults = BacktestConfig::default();
    BacktestConfig {
        initial_capital: adapter.get_double("backtest", "initial_capital", defaults.initial_capital),
        risk_free_rate: adapter.get_double("backtest", "risk_free_rate", defaults.risk_free_rate),
    }
}

/// `[backtest] start_date..end_date`; an absent bound means unbounded.
pub fn resolve_date_range(adapter: &dyn ConfigPort) -> Result<(NaiveDate, NaiveDate), ScoutError> {
    let start = parse_optional_date(adapter, "backtest", "start_date")?.unwrap_or(NaiveDate::MIN);
    let end = parse_optional_date(adapter, "backtest", "end_date")?.unwrap_or(NaiveDate::MAX);
    Ok((start, end))
}

/// Upper-cased symbols from a comma-separated list, first occurrence kept.
pub fn resolve_symbols(symbol_arg: &str) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for symbol in symbol_arg
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
    {
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    symbols
}

pub fn resolve_backtest_symbol(
    symbol_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Option<String> {
    symbol_override
        .map(str::to_string)
        .or_else(|| config.get_string("backtest", "symbol"))
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
}

/// Everything the live path produced for one symbol.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub symbol: String,
    pub as_of: NaiveDate,
    pub spot: f64,
    pub frame: IndicatorFrame,
    pub sentiment: Vec<SentimentSignal>,
    pub directive: Directive,
    pub selection: Selection,
}

/// Price history → indicators → directive → contract selection.
///
/// The chain is only fetched for an actionable directive.
pub fn analyze_symbol(
    symbol: &str,
    as_of: Option<NaiveDate>,
    prices: &dyn DataPort,
    chains: &dyn OptionChainPort,
    providers: &[&dyn SentimentPort],
    config: &SelectionConfig,
) -> Result<Analysis, ScoutError> {
    let history = prices.fetch_ohlcv(symbol, NaiveDate::MIN, as_of.unwrap_or(NaiveDate::MAX))?;
    let Some(last) = history.last() else {
        return Err(ScoutError::DataUnavailable {
            symbol: symbol.to_string(),
        });
    };
    let spot = last.close;
    let as_of = as_of.unwrap_or(last.date);

    let window_start = as_of
        .checked_sub_signed(Duration::days(ANALYSIS_LOOKBACK_DAYS))
        .unwrap_or(NaiveDate::MIN);
    let bars: Vec<_> = history
        .into_iter()
        .filter(|b| b.date > window_start)
        .collect();

    let frame = build_frame(symbol, &bars);
    if frame.complete_rows().is_empty() {
        log::warn!(
            "{}: {} bars in the last {} days, indicators still warming up",
            symbol,
            frame.len(),
            ANALYSIS_LOOKBACK_DAYS
        );
    }

    let sentiment = collect_signals(providers, symbol);
    let directive = generate_directive(&frame, &sentiment);

    let selection = if directive.is_actionable() {
        let chain = chains.fetch_chain(symbol)?;
        selection::find_contracts(directive, &chain, spot, as_of, config)?
    } else {
        Selection::Empty(EmptyReason::NotActionable)
    };

    Ok(Analysis {
        symbol: symbol.to_string(),
        as_of,
        spot,
        frame,
        sentiment,
        directive,
        selection,
    })
}

fn format_score(score: Option<f64>) -> String {
    score
        .map(|s| format!("{:.2}", s))
        .unwrap_or_else(|| "n/a".to_string())
}

fn print_analysis(analysis: &Analysis, config: &SelectionConfig) {
    println!(
        "\n=== {} (as of {}, close {:.2}) ===",
        analysis.symbol, analysis.as_of, analysis.spot
    );

    if !analysis.sentiment.is_empty() {
        let parts: Vec<String> = analysis
            .sentiment
            .iter()
            .map(|s| format!("{} {}", s.source, format_score(s.score)))
            .collect();
        println!(
            "Sentiment:   {} -> {}",
            parts.join(", "),
            format_score(effective_sentiment(&analysis.sentiment))
        );
    }
    println!("Suggestion:  {}", analysis.directive);

    match &analysis.selection {
        Selection::Found {
            expiration,
            contracts,
        } => {
            println!("\n--- Suggested contracts (expiring {}) ---", expiration);
            println!(
                "{:<22} {:>9} {:>7} {:>7} {:>8} {:>7} {:>6} {:>10}  {}",
                "Contract", "Strike", "Last", "IV", "OI", "Delta", "PoP", "Breakeven", "Reasoning"
            );
            for c in contracts {
                println!(
                    "{:<22} {:>9.2} {:>7.2} {:>6.1}% {:>8} {:>7.3} {:>5.1}% {:>10.2}  {}",
                    c.contract.contract_symbol,
                    c.contract.strike,
                    c.contract.last_price,
                    c.contract.implied_volatility * 100.0,
                    c.contract.open_interest,
                    c.delta,
                    c.probability_of_profit,
                    c.breakeven,
                    c.reasoning
                );
            }
        }
        Selection::Empty(EmptyReason::NotActionable) => {
            println!("No trade suggested.");
        }
        Selection::Empty(EmptyReason::NoValidExpiration) => {
            println!(
                "No expiration at least {} days out.",
                selection::MIN_DAYS_TO_EXPIRY
            );
        }
        Selection::Empty(EmptyReason::NoEligibleContract) => {
            println!(
                "No out-of-the-money contract under ${:.2} with |delta| >= {:.2}.",
                config.max_cost, config.min_abs_delta
            );
        }
    }
}

fn run_analyze(
    config_path: &PathBuf,
    symbol_arg: &str,
    as_of: Option<NaiveDate>,
    max_cost: Option<f64>,
    use_sentiment: bool,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_options_config(&adapter) {
        return fail(&e);
    }
    let dir = match data_dir(&adapter) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };

    let mut config = build_selection_config(&adapter);
    if let Some(cost) = max_cost {
        if !cost.is_finite() || cost <= 0.0 {
            return fail(&ScoutError::ConfigInvalid {
                section: "options".into(),
                key: "max_cost".into(),
                reason: "--max-cost must be positive".into(),
            });
        }
        config.max_cost = cost;
    }

    let symbols = resolve_symbols(symbol_arg);
    if symbols.is_empty() {
        eprintln!("error: no symbols given");
        return ExitCode::from(2);
    }

    let prices = CsvAdapter::new(dir.clone());
    let chains = JsonChainAdapter::new(dir.clone());
    let sentiment_adapters = if use_sentiment {
        sentiment_providers(&adapter, dir)
    } else {
        Vec::new()
    };
    let providers: Vec<&dyn SentimentPort> = sentiment_adapters
        .iter()
        .map(|a| a as &dyn SentimentPort)
        .collect();

    let mut first_failure: Option<ExitCode> = None;
    for symbol in &symbols {
        log::info!("Analyzing {}", symbol);
        match analyze_symbol(symbol, as_of, &prices, &chains, &providers, &config) {
            Ok(analysis) => {
                print_analysis(&analysis, &config);
                if analysis.directive.is_actionable() {
                    if let Err(e) = analysis.selection.clone().require(symbol) {
                        first_failure.get_or_insert((&e).into());
                    }
                }
            }
            Err(e) => {
                eprintln!("error: {}: {e}", symbol);
                first_failure.get_or_insert((&e).into());
            }
        }
    }

    first_failure.unwrap_or(ExitCode::SUCCESS)
}

/// Sentiment providers, unless `[sentiment] enabled = false`.
fn sentiment_providers(adapter: &dyn ConfigPort, dir: PathBuf) -> Vec<JsonSentimentAdapter> {
    if adapter.get_bool("sentiment", "enabled", true) {
        JsonSentimentAdapter::all(dir)
    } else {
        log::info!("Sentiment disabled by config");
        Vec::new()
    }
}

/// Load, warm up and replay one symbol, then compute its metrics.
pub fn backtest_symbol(
    data: &dyn DataPort,
    symbol: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    config: &BacktestConfig,
) -> Result<(BacktestResult, Metrics), ScoutError> {
    let bars = data.fetch_ohlcv(symbol, start_date, end_date)?;
    let frame = build_frame(symbol, &bars);
    let result = backtest_engine::run_backtest(&frame, config)?;
    let metrics = Metrics::compute(&result.portfolio, config.risk_free_rate);
    Ok((result, metrics))
}

fn print_backtest(result: &BacktestResult, metrics: &Metrics) {
    println!("\n=== Backtest: {} ===", result.symbol);
    println!(
        "Bars:             {} ({} warm-up skipped)",
        result.bars_processed(),
        result.warmup_bars
    );
    println!("Total Return:     {:.2}%", metrics.total_return * 100.0);
    println!("Final Equity:     ${:.2}", metrics.final_equity);
    println!("Net Profit:       ${:.2}", metrics.net_profit);
    println!("Annualized:       {:.2}%", metrics.annualized_return * 100.0);
    println!("Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
    println!("Sortino Ratio:    {:.2}", metrics.sortino_ratio);
    println!(
        "Max Drawdown:     -{:.1}% ({} bars)",
        metrics.max_drawdown * 100.0,
        metrics.max_drawdown_duration
    );
    println!(
        "Trades:           {} entries, {} closed",
        metrics.entries, metrics.closed_trades
    );
    println!("Win Rate:         {:.1}%", metrics.win_rate * 100.0);
    println!("Profit Factor:    {:.2}", metrics.profit_factor);

    if !result.portfolio.trades.is_empty() {
        println!("\n--- Trade log ---");
        for t in &result.portfolio.trades {
            println!("{}  {:<5} {:>10.2} {:>12.2}", t.date, t.kind, t.price, t.pnl);
        }
    }
}

fn run_backtest(
    config_path: &PathBuf,
    symbol_override: Option<&str>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(&e);
    }
    let dir = match data_dir(&adapter) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };
    let (start_date, end_date) = match resolve_date_range(&adapter) {
        Ok(range) => range,
        Err(e) => return fail(&e),
    };
    let Some(symbol) = resolve_backtest_symbol(symbol_override, &adapter) else {
        return fail(&ScoutError::ConfigMissing {
            section: "backtest".into(),
            key: "symbol".into(),
        });
    };

    let bt_config = build_backtest_config(&adapter);
    let data = CsvAdapter::new(dir);

    log::info!(
        "Running backtest for {} with capital {:.2}",
        symbol,
        bt_config.initial_capital
    );
    let (result, metrics) =
        match backtest_symbol(&data, &symbol, start_date, end_date, &bt_config) {
            Ok(r) => r,
            Err(e) => return fail(&e),
        };

    print_backtest(&result, &metrics);

    if let Some(output) = output_path {
        if let Err(e) = CsvReportAdapter::new().write(&result, &metrics, &output.to_string_lossy()) {
            return fail(&e);
        }
        eprintln!("\nReport written to: {}", output.display());
    }

    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let checks: [(&str, fn(&dyn ConfigPort) -> Result<(), ScoutError>); 3] = [
        ("data", validate_data_config),
        ("options", validate_options_config),
        ("backtest", validate_backtest_config),
    ];

    let mut first_failure: Option<ExitCode> = None;
    for (section, check) in checks {
        match check(&adapter) {
            Ok(()) => eprintln!("[{}] ok", section),
            Err(e) => {
                eprintln!("[{}] error: {e}", section);
                first_failure.get_or_insert((&e).into());
            }
        }
    }

    match first_failure {
        Some(code) => code,
        None => {
            eprintln!("Configuration is valid");
            ExitCode::SUCCESS
        }
    }
}

fn run_list_symbols(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let dir = match data_dir(&adapter) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };

    match CsvAdapter::new(dir.clone()).list_symbols() {
        Ok(symbols) if symbols.is_empty() => {
            eprintln!("No price files found in {}", dir.display());
            ExitCode::SUCCESS
        }
        Ok(symbols) => {
            for symbol in &symbols {
                println!("{}", symbol);
            }
            eprintln!("{} symbols found", symbols.len());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn cli_parses_analyze() {
        let cli = Cli::try_parse_from([
            "optscout",
            "analyze",
            "--symbol",
            "aapl,msft",
            "--config",
            "cfg.ini",
            "--as-of",
            "2024-06-03",
            "--max-cost",
            "35",
        ])
        .unwrap();
        match cli.command {
            Command::Analyze {
                symbol,
                as_of,
                max_cost,
                no_sentiment,
                ..
            } => {
                assert_eq!(resolve_symbols(&symbol), vec!["AAPL", "MSFT"]);
                assert_eq!(as_of, NaiveDate::from_ymd_opt(2024, 6, 3));
                assert_eq!(max_cost, Some(35.0));
                assert!(!no_sentiment);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn repeated_symbols_are_analyzed_once() {
        assert_eq!(
            resolve_symbols(" msft, AAPL,,msft ,aapl"),
            vec!["MSFT", "AAPL"]
        );
        assert!(resolve_symbols(" , ").is_empty());
    }

    #[test]
    fn cli_rejects_bad_as_of() {
        let parsed = Cli::try_parse_from([
            "optscout", "analyze", "-s", "AAPL", "-c", "cfg.ini", "--as-of", "June 3rd",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn selection_config_defaults_and_overrides() {
        let defaults = build_selection_config(&config("[options]\n"));
        assert_eq!(defaults, SelectionConfig::default());

        let custom = build_selection_config(&config("[options]\nmax_cost = 50\nmax_results = 3\n"));
        assert_eq!(custom.max_cost, 50.0);
        assert_eq!(custom.max_results, 3);
        assert_eq!(custom.min_abs_delta, 0.15);
    }

    #[test]
    fn backtest_config_defaults() {
        let bt = build_backtest_config(&config("[backtest]\n"));
        assert_eq!(bt, BacktestConfig::default());
    }

    #[test]
    fn date_range_is_unbounded_when_absent() {
        let (start, end) = resolve_date_range(&config("[backtest]\nend_date = 2024-01-31\n")).unwrap();
        assert_eq!(start, NaiveDate::MIN);
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[test]
    fn backtest_symbol_prefers_override() {
        let cfg = config("[backtest]\nsymbol = msft\n");
        assert_eq!(resolve_backtest_symbol(Some("aapl"), &cfg), Some("AAPL".into()));
        assert_eq!(resolve_backtest_symbol(None, &cfg), Some("MSFT".into()));
        assert_eq!(resolve_backtest_symbol(None, &config("[backtest]\n")), None);
    }

    #[test]
    fn data_dir_requires_key() {
        assert!(data_dir(&config("[data]\n")).is_err());
        assert_eq!(
            data_dir(&config("[data]\ndir = /tmp/prices \n")).unwrap(),
            PathBuf::from("/tmp/prices")
        );
    }
}
