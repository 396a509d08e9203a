//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_report_adapter;
pub mod file_config_adapter;
pub mod json_chain_adapter;
pub mod json_sentiment_adapter;
pub mod memory_cache;
