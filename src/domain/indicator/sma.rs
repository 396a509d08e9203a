//! Simple Moving Average indicator.
//!
//! SMA[i] = mean(C[i-n+1..=i]), maintained as a rolling sum.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Sma(period),
            values: bars.iter().map(|b| IndicatorPoint::warmup(b.date)).collect(),
        };
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        sum += bar.close;
        if i >= period {
            sum -= bars[i - period].close;
        }

        if i + 1 < period {
            values.push(IndicatorPoint::warmup(bar.date));
        } else {
            values.push(IndicatorPoint::ready(bar.date, sum / period as f64));
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                symbol: "TEST".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn sma_warmup() {
        let series = calculate_sma(&make_bars(&[10.0, 20.0, 30.0, 40.0]), 3);
        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[3].valid);
    }

    #[test]
    fn sma_rolling_mean() {
        let series = calculate_sma(&make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]), 3);
        assert!((series.value_at(2).unwrap() - 20.0).abs() < 1e-12);
        assert!((series.value_at(3).unwrap() - 30.0).abs() < 1e-12);
        assert!((series.value_at(4).unwrap() - 40.0).abs() < 1e-12);
    }

    #[test]
    fn sma_period_1_is_close() {
        let series = calculate_sma(&make_bars(&[10.0, 20.0]), 1);
        assert_eq!(series.value_at(0), Some(10.0));
        assert_eq!(series.value_at(1), Some(20.0));
    }

    #[test]
    fn sma_fewer_bars_than_period() {
        let series = calculate_sma(&make_bars(&[10.0, 20.0]), 5);
        assert_eq!(series.values.len(), 2);
        assert!(series.values.iter().all(|p| !p.valid));
    }

    #[test]
    fn sma_period_0() {
        let series = calculate_sma(&make_bars(&[10.0, 20.0]), 0);
        assert!(series.values.iter().all(|p| !p.valid));
    }

    #[test]
    fn sma_empty_bars() {
        assert!(calculate_sma(&[], 3).values.is_empty());
    }
}
