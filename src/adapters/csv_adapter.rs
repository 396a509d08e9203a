//! CSV file price-history adapter.
//!
//! One file per symbol, `{SYMBOL}.csv`, with a `date,open,high,low,close,volume`
//! header.

use crate::domain::error::ScoutError;
use crate::domain::ohlcv::{is_chronological, OhlcvBar};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct BarRecord {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol.to_uppercase()))
    }

    fn to_bar(symbol: &str, record: BarRecord) -> Result<OhlcvBar, ScoutError> {
        let date = NaiveDate::parse_from_str(record.date.trim(), "%Y-%m-%d").map_err(|e| {
            ScoutError::MalformedInput {
                reason: format!("{}: invalid date {:?}: {}", symbol, record.date, e),
            }
        })?;

        if !record.volume.is_finite() || record.volume < 0.0 {
            return Err(ScoutError::MalformedInput {
                reason: format!("{} {}: invalid volume {}", symbol, date, record.volume),
            });
        }

        let bar = OhlcvBar {
            symbol: symbol.to_string(),
            date,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume as i64,
        };
        if !bar.is_well_formed() {
            return Err(ScoutError::MalformedInput {
                reason: format!("{} {}: inconsistent OHLC values", symbol, date),
            });
        }
        Ok(bar)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, ScoutError> {
        let path = self.csv_path(symbol);
        if !path.exists() {
            return Err(ScoutError::DataUnavailable {
                symbol: symbol.to_string(),
            });
        }

        let content = fs::read_to_string(&path)?;
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut bars = Vec::new();
        for result in rdr.deserialize::<BarRecord>() {
            let record = result.map_err(|e| ScoutError::MalformedInput {
                reason: format!("{}: {}", path.display(), e),
            })?;
            let bar = Self::to_bar(symbol, record)?;
            if bar.date >= start_date && bar.date <= end_date {
                bars.push(bar);
            }
        }

        bars.sort_by_key(|b| b.date);
        if !is_chronological(&bars) {
            return Err(ScoutError::MalformedInput {
                reason: format!("{}: duplicate dates", path.display()),
            });
        }

        log::debug!("{}: loaded {} bars from {}", symbol, bars.len(), path.display());
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScoutError> {
        let mut symbols = Vec::new();

        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem() {
                    symbols.push(stem.to_string_lossy().to_string());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
