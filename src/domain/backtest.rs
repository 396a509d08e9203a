//! Bar-by-bar replay of the technical strategy.
//!
//! Each complete bar: exit an open position whose signal lapsed, enter on a
//! fresh signal when flat (same bar), then mark equity to market. No
//! look-ahead: only the current row is consulted.

use crate::domain::error::ScoutError;
use crate::domain::indicator_helpers::{IndicatorFrame, WARMUP_BARS};
use crate::domain::portfolio::Portfolio;
use crate::domain::signal::{is_bearish, is_bullish};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Annual rate used when computing risk-adjusted metrics.
    pub risk_free_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 10_000.0,
            risk_free_rate: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub symbol: String,
    pub portfolio: Portfolio,
    /// Bars in the input frame that were still warming up.
    pub warmup_bars: usize,
}

impl BacktestResult {
    pub fn bars_processed(&self) -> usize {
        self.portfolio.equity_curve.len()
    }
}

pub fn run_backtest(
    frame: &IndicatorFrame,
    config: &BacktestConfig,
) -> Result<BacktestResult, ScoutError> {
    if !config.initial_capital.is_finite() || config.initial_capital <= 0.0 {
        return Err(ScoutError::ConfigInvalid {
            section: "backtest".into(),
            key: "initial_capital".into(),
            reason: "initial_capital must be positive".into(),
        });
    }
    if frame.is_empty() {
        return Err(ScoutError::DataUnavailable {
            symbol: frame.symbol.clone(),
        });
    }

    let rows = frame.complete_rows();
    if rows.is_empty() {
        return Err(ScoutError::IndicatorWarmupIncomplete {
            bars: frame.len(),
            required: WARMUP_BARS,
        });
    }

    let mut portfolio = Portfolio::new(config.initial_capital);

    for row in &rows {
        let bullish = is_bullish(row);
        let bearish = is_bearish(row);

        let lapsed = (portfolio.position.is_long() && !bullish)
            || (portfolio.position.is_short() && !bearish);
        if lapsed {
            if let Some(pnl) = portfolio.exit(row.date, row.close) {
                log::debug!("{} {}: exit at {:.2}, pnl {:.2}", frame.symbol, row.date, row.close, pnl);
            }
        }

        if portfolio.position.is_flat() {
            if bullish {
                portfolio.enter_long(row.date, row.close);
                log::debug!("{} {}: long at {:.2}", frame.symbol, row.date, row.close);
            } else if bearish {
                portfolio.enter_short(row.date, row.close);
                log::debug!("{} {}: short at {:.2}", frame.symbol, row.date, row.close);
            }
        }

        let equity = portfolio.total_equity(row.close);
        portfolio.record_equity(row.date, equity);
    }

    log::info!(
        "{}: backtest over {} bars, {} trades, final equity {:.2}",
        frame.symbol,
        rows.len(),
        portfolio.trades.len(),
        portfolio.final_equity()
    );

    Ok(BacktestResult {
        symbol: frame.symbol.clone(),
        warmup_bars: frame.len() - rows.len(),
        portfolio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator_helpers::TechnicalPoint;
    use crate::domain::position::TradeKind;
    use chrono::NaiveDate;

    fn day(i: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i)
    }

    fn row(i: i64, close: f64, sma_50: f64, sma_200: f64, rsi: f64) -> TechnicalPoint {
        TechnicalPoint {
            date: day(i),
            close,
            sma_50: Some(sma_50),
            sma_200: Some(sma_200),
            rsi_14: Some(rsi),
        }
    }

    fn bull(i: i64, close: f64) -> TechnicalPoint {
        row(i, close, close - 5.0, close - 10.0, 55.0)
    }

    fn bear(i: i64, close: f64) -> TechnicalPoint {
        row(i, close, close + 5.0, close + 10.0, 45.0)
    }

    fn neutral(i: i64, close: f64) -> TechnicalPoint {
        row(i, close, close - 5.0, close - 10.0, 80.0)
    }

    fn frame(points: Vec<TechnicalPoint>) -> IndicatorFrame {
        IndicatorFrame {
            symbol: "TEST".into(),
            points,
        }
    }

    fn config() -> BacktestConfig {
        BacktestConfig {
            initial_capital: 10_000.0,
            risk_free_rate: 0.0,
        }
    }

    #[test]
    fn long_then_flat() {
        let f = frame(vec![bull(0, 100.0), bull(1, 105.0), neutral(2, 110.0), neutral(3, 90.0)]);
        let result = run_backtest(&f, &config()).unwrap();
        let p = &result.portfolio;

        assert_eq!(p.trades.len(), 2);
        assert_eq!(p.trades[0].kind, TradeKind::Buy);
        assert_eq!(p.trades[1].kind, TradeKind::Sell);
        assert!((p.trades[1].pnl - 1_000.0).abs() < 1e-9);

        let equity: Vec<f64> = p.equity_curve.iter().map(|e| e.equity).collect();
        assert!((equity[0] - 10_000.0).abs() < 1e-9);
        assert!((equity[1] - 10_500.0).abs() < 1e-9);
        assert!((equity[2] - 11_000.0).abs() < 1e-9);
        assert!((equity[3] - 11_000.0).abs() < 1e-9);
    }

    #[test]
    fn short_marks_to_market() {
        let f = frame(vec![bear(0, 100.0), bear(1, 90.0), neutral(2, 95.0)]);
        let result = run_backtest(&f, &config()).unwrap();
        let p = &result.portfolio;

        assert_eq!(p.trades[0].kind, TradeKind::Short);
        assert!((p.equity_curve[1].equity - 11_000.0).abs() < 1e-9);
        assert_eq!(p.trades[1].kind, TradeKind::Cover);
        assert!((p.trades[1].pnl - 500.0).abs() < 1e-9);
        assert!((p.cash - 10_500.0).abs() < 1e-9);
    }

    #[test]
    fn reversal_exits_and_enters_same_bar() {
        let f = frame(vec![bull(0, 100.0), bear(1, 80.0)]);
        let result = run_backtest(&f, &config()).unwrap();
        let kinds: Vec<TradeKind> = result.portfolio.trades.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TradeKind::Buy, TradeKind::Sell, TradeKind::Short]);
        assert!(result.portfolio.trades.iter().skip(1).all(|t| t.date == day(1)));
        assert!(result.portfolio.position.is_short());
    }

    #[test]
    fn open_position_stays_open_at_end() {
        let f = frame(vec![bull(0, 100.0), bull(1, 120.0)]);
        let result = run_backtest(&f, &config()).unwrap();
        assert_eq!(result.portfolio.trades.len(), 1);
        assert!(result.portfolio.position.is_long());
        assert!((result.portfolio.final_equity() - 12_000.0).abs() < 1e-9);
    }

    #[test]
    fn warmup_rows_are_skipped() {
        let mut warm = neutral(0, 100.0);
        warm.sma_200 = None;
        let f = frame(vec![warm, bull(1, 100.0), neutral(2, 100.0)]);
        let result = run_backtest(&f, &config()).unwrap();
        assert_eq!(result.bars_processed(), 2);
        assert_eq!(result.warmup_bars, 1);
        assert_eq!(result.portfolio.equity_curve[0].date, day(1));
    }

    #[test]
    fn all_warmup_is_explicit_error() {
        let mut warm = bull(0, 100.0);
        warm.rsi_14 = None;
        let err = run_backtest(&frame(vec![warm]), &config()).unwrap_err();
        assert!(matches!(
            err,
            ScoutError::IndicatorWarmupIncomplete { bars: 1, required: 200 }
        ));
    }

    #[test]
    fn empty_frame_is_data_unavailable() {
        let err = run_backtest(&frame(vec![]), &config()).unwrap_err();
        assert!(matches!(err, ScoutError::DataUnavailable { .. }));
    }

    #[test]
    fn non_positive_capital_rejected() {
        let cfg = BacktestConfig {
            initial_capital: 0.0,
            ..config()
        };
        let err = run_backtest(&frame(vec![bull(0, 100.0)]), &cfg).unwrap_err();
        assert!(matches!(err, ScoutError::ConfigInvalid { .. }));
    }

    #[test]
    fn no_signal_keeps_cash() {
        let f = frame(vec![neutral(0, 100.0), neutral(1, 50.0)]);
        let result = run_backtest(&f, &config()).unwrap();
        assert!(result.portfolio.trades.is_empty());
        assert!(result
            .portfolio
            .equity_curve
            .iter()
            .all(|e| (e.equity - 10_000.0).abs() < f64::EPSILON));
    }
}
