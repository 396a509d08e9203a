//! OHLCV bar representation.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// All prices finite and positive, high/low bracketing close, volume non-negative.
    pub fn is_well_formed(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        prices.iter().all(|p| p.is_finite() && *p > 0.0)
            && self.low <= self.high
            && self.close <= self.high
            && self.close >= self.low
            && self.volume >= 0
    }
}

/// True when dates are strictly increasing.
pub fn is_chronological(bars: &[OhlcvBar]) -> bool {
    bars.windows(2).all(|w| w[0].date < w[1].date)
}
