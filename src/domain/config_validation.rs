//! Configuration validation.
//!
//! Checks the `[data]`, `[options]` and `[backtest]` sections before any
//! adapter is built. Keys that are absent fall back to their defaults, so only
//! values that are present are range-checked; `[data] dir` is required.

use crate::domain::error::ScoutError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), ScoutError> {
    match config.get_string("data", "dir") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(ScoutError::ConfigMissing {
            section: "data".to_string(),
            key: "dir".to_string(),
        }),
    }
}

pub fn validate_options_config(config: &dyn ConfigPort) -> Result<(), ScoutError> {
    validate_max_cost(config)?;
    validate_unit_interval(config, "options", "risk_free_rate")?;
    validate_unit_interval(config, "options", "min_abs_delta")?;
    validate_proximity_band(config)?;
    validate_max_results(config)?;
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), ScoutError> {
    validate_initial_capital(config)?;
    validate_unit_interval(config, "backtest", "risk_free_rate")?;
    validate_dates(config)?;
    Ok(())
}

/// Parses a `YYYY-MM-DD` value; `Ok(None)` when the key is absent.
pub fn parse_optional_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, ScoutError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ScoutError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", key),
            }),
    }
}

fn validate_max_cost(config: &dyn ConfigPort) -> Result<(), ScoutError> {
    let value = config.get_double("options", "max_cost", 20.0);
    if !value.is_finite() || value <= 0.0 {
        return Err(ScoutError::ConfigInvalid {
            section: "options".to_string(),
            key: "max_cost".to_string(),
            reason: "max_cost must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_unit_interval(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), ScoutError> {
    let value = config.get_double(section, key, 0.0);
    if !(0.0..1.0).contains(&value) {
        return Err(ScoutError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{} must be between 0 and 1", key),
        });
    }
    Ok(())
}

fn validate_proximity_band(config: &dyn ConfigPort) -> Result<(), ScoutError> {
    let value = config.get_double("options", "proximity_band", 0.15);
    if !value.is_finite() || value <= 0.0 {
        return Err(ScoutError::ConfigInvalid {
            section: "options".to_string(),
            key: "proximity_band".to_string(),
            reason: "proximity_band must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_max_results(config: &dyn ConfigPort) -> Result<(), ScoutError> {
    let value = config.get_int("options", "max_results", 5);
    if value < 1 {
        return Err(ScoutError::ConfigInvalid {
            section: "options".to_string(),
            key: "max_results".to_string(),
            reason: "max_results must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), ScoutError> {
    let value = config.get_double("backtest", "initial_capital", 10_000.0);
    if !value.is_finite() || value <= 0.0 {
        return Err(ScoutError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_capital".to_string(),
            reason: "initial_capital must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), ScoutError> {
    let start_date = parse_optional_date(config, "backtest", "start_date")?;
    let end_date = parse_optional_date(config, "backtest", "end_date")?;

    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start >= end {
            return Err(ScoutError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "start_date".to_string(),
                reason: "start_date must be before end_date".to_string(),
            });
        }
    }
    Ok(())
}
