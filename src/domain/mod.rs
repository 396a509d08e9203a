//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod indicator_helpers;
pub mod sentiment;
pub mod signal;
pub mod option;
pub mod pricing;
pub mod selection;
pub mod position;
pub mod portfolio;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
