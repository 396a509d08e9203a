//! Report output port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::ScoutError;
use crate::domain::metrics::Metrics;

/// Port for writing backtest output (trade log, equity curve, summary).
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        metrics: &Metrics,
        output_path: &str,
    ) -> Result<(), ScoutError>;
}
