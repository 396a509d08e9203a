//! Per-bar technical frame: close aligned with SMA(50), SMA(200) and RSI(14).

use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub const RSI_PERIOD: usize = 14;
pub const FAST_SMA_PERIOD: usize = 50;
pub const SLOW_SMA_PERIOD: usize = 200;

/// Bars needed before every indicator in a [`TechnicalPoint`] is defined.
pub const WARMUP_BARS: usize = SLOW_SMA_PERIOD;

/// One bar of the frame. Indicator values are `None` during warm-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TechnicalPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub rsi_14: Option<f64>,
}

/// A fully-defined row, usable by the backtest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletePoint {
    pub date: NaiveDate,
    pub close: f64,
    pub sma_50: f64,
    pub sma_200: f64,
    pub rsi_14: f64,
}

impl TechnicalPoint {
    pub fn complete(&self) -> Option<CompletePoint> {
        Some(CompletePoint {
            date: self.date,
            close: self.close,
            sma_50: self.sma_50?,
            sma_200: self.sma_200?,
            rsi_14: self.rsi_14?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndicatorFrame {
    pub symbol: String,
    pub points: Vec<TechnicalPoint>,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&TechnicalPoint> {
        self.points.last()
    }

    /// Rows with every indicator defined, in date order.
    pub fn complete_rows(&self) -> Vec<CompletePoint> {
        self.points.iter().filter_map(TechnicalPoint::complete).collect()
    }
}

pub fn build_frame(symbol: &str, bars: &[OhlcvBar]) -> IndicatorFrame {
    let sma_50 = calculate_sma(bars, FAST_SMA_PERIOD);
    let sma_200 = calculate_sma(bars, SLOW_SMA_PERIOD);
    let rsi_14 = calculate_rsi(bars, RSI_PERIOD);

    let points = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| TechnicalPoint {
            date: bar.date,
            close: bar.close,
            sma_50: sma_50.value_at(i),
            sma_200: sma_200.value_at(i),
            rsi_14: rsi_14.value_at(i),
        })
        .collect();

    IndicatorFrame {
        symbol: symbol.to_string(),
        points,
    }
}
