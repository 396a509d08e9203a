//! CSV backtest report adapter.
//!
//! Writes three files into the output directory: `trades.csv`,
//! `equity.csv` and `summary.csv`.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::ScoutError;
use crate::domain::metrics::Metrics;
use crate::ports::report_port::ReportPort;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Serialize)]
struct TradeRow<'a> {
    symbol: &'a str,
    date: String,
    kind: String,
    price: f64,
    pnl: f64,
}

#[derive(Serialize)]
struct EquityRow {
    date: String,
    equity: f64,
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    metric: &'a str,
    value: String,
}

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        CsvReportAdapter
    }
}

fn csv_error(path: &Path, e: csv::Error) -> ScoutError {
    ScoutError::Io(std::io::Error::other(format!("{}: {}", path.display(), e)))
}

fn write_rows<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<(), ScoutError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| csv_error(path, e))?;
    }
    writer.flush()?;
    Ok(())
}

fn summary_rows<'a>(result: &'a BacktestResult, metrics: &Metrics) -> Vec<SummaryRow<'a>> {
    let position = &result.portfolio.position;
    let open_position = if position.is_long() {
        "Long"
    } else if position.is_short() {
        "Short"
    } else {
        "Flat"
    };

    [
        ("symbol", result.symbol.clone()),
        ("bars_processed", result.bars_processed().to_string()),
        ("warmup_bars", result.warmup_bars.to_string()),
        ("initial_capital", format!("{:.2}", result.portfolio.initial_capital)),
        ("final_equity", format!("{:.2}", metrics.final_equity)),
        ("net_profit", format!("{:.2}", metrics.net_profit)),
        ("total_return", format!("{:.6}", metrics.total_return)),
        ("annualized_return", format!("{:.6}", metrics.annualized_return)),
        ("sharpe_ratio", format!("{:.4}", metrics.sharpe_ratio)),
        ("sortino_ratio", format!("{:.4}", metrics.sortino_ratio)),
        ("max_drawdown", format!("{:.6}", metrics.max_drawdown)),
        ("max_drawdown_duration", metrics.max_drawdown_duration.to_string()),
        ("entries", metrics.entries.to_string()),
        ("closed_trades", metrics.closed_trades.to_string()),
        ("win_rate", format!("{:.4}", metrics.win_rate)),
        ("profit_factor", format!("{:.4}", metrics.profit_factor)),
        ("avg_holding_days", format!("{:.2}", metrics.avg_holding_days)),
        ("open_position", open_position.to_string()),
    ]
    .into_iter()
    .map(|(metric, value)| SummaryRow { metric, value })
    .collect()
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        metrics: &Metrics,
        output_path: &str,
    ) -> Result<(), ScoutError> {
        let dir = Path::new(output_path);
        fs::create_dir_all(dir)?;

        write_rows(
            &dir.join("trades.csv"),
            result.portfolio.trades.iter().map(|t| TradeRow {
                symbol: &result.symbol,
                date: t.date.to_string(),
                kind: t.kind.to_string(),
                price: t.price,
                pnl: t.pnl,
            }),
        )?;

        write_rows(
            &dir.join("equity.csv"),
            result.portfolio.equity_curve.iter().map(|p| EquityRow {
                date: p.date.to_string(),
                equity: p.equity,
            }),
        )?;

        write_rows(&dir.join("summary.csv"), summary_rows(result, metrics))?;

        log::info!("{}: report written to {}", result.symbol, dir.display());
        Ok(())
    }
}
