//! Price history port trait.

use crate::domain::error::ScoutError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily bars for `symbol` with `start_date <= date <= end_date`, oldest
    /// first. An empty vector is a valid answer; the caller decides whether
    /// that is an error.
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, ScoutError>;

    fn list_symbols(&self) -> Result<Vec<String>, ScoutError>;
}
