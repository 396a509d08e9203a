//! Port traits: the boundary between the domain and the outside world.

pub mod cache_port;
pub mod config_port;
pub mod data_port;
pub mod option_chain_port;
pub mod report_port;
pub mod sentiment_port;
