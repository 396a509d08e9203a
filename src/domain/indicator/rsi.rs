//! RSI (Relative Strength Index) with Wilder's smoothing.
//!
//! - First average: simple mean of gains/losses over the first n price changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n bars are invalid (need n price changes to seed the averages).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Rsi(period);

    if period == 0 || bars.len() < 2 {
        return IndicatorSeries {
            indicator_type,
            values: bars.iter().map(|b| IndicatorPoint::warmup(b.date)).collect(),
        };
    }

    let mut values = Vec::with_capacity(bars.len());
    values.push(IndicatorPoint::warmup(bars[0].date));

    let mut sum_gain = 0.0;
    let mut sum_loss = 0.0;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    let n = period as f64;

    for (change_idx, pair) in bars.windows(2).enumerate() {
        let change = pair[1].close - pair[0].close;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        let date = pair[1].date;

        if change_idx < period - 1 {
            sum_gain += gain;
            sum_loss += loss;
            values.push(IndicatorPoint::warmup(date));
            continue;
        }

        if change_idx == period - 1 {
            avg_gain = (sum_gain + gain) / n;
            avg_loss = (sum_loss + loss) / n;
        } else {
            avg_gain = (avg_gain * (n - 1.0) + gain) / n;
            avg_loss = (avg_loss * (n - 1.0) + loss) / n;
        }

        let rsi = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
        };
        values.push(IndicatorPoint::ready(date, rsi));
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}
