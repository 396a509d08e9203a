//! JSON option-chain adapter.
//!
//! Reads `{SYMBOL}_chain.json` from the data directory:
//!
//! ```json
//! {
//!   "expirations": ["2024-02-16", "2024-03-15"],
//!   "chains": {
//!     "2024-02-16": { "calls": [ ... ], "puts": [ ... ] }
//!   }
//! }
//! ```
//!
//! Contract rows use the provider's camelCase field names. Missing open
//! interest or volume (`null`) reads as 0.

use crate::domain::error::ScoutError;
use crate::domain::option::{OptionChain, OptionContract};
use crate::ports::option_chain_port::OptionChainPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct ChainDocument {
    expirations: Vec<String>,
    #[serde(default)]
    chains: BTreeMap<String, ExpirationRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct ExpirationRecord {
    #[serde(default)]
    calls: Vec<ContractRecord>,
    #[serde(default)]
    puts: Vec<ContractRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContractRecord {
    contract_symbol: String,
    strike: f64,
    last_price: f64,
    implied_volatility: f64,
    #[serde(default)]
    open_interest: Option<f64>,
    #[serde(default)]
    volume: Option<f64>,
    in_the_money: bool,
}

impl ContractRecord {
    fn into_contract(self, expiration: NaiveDate) -> Result<OptionContract, ScoutError> {
        let open_interest = count_field(&self.contract_symbol, "openInterest", self.open_interest)?;
        let volume = count_field(&self.contract_symbol, "volume", self.volume)?;
        Ok(OptionContract {
            contract_symbol: self.contract_symbol,
            strike: self.strike,
            last_price: self.last_price,
            implied_volatility: self.implied_volatility,
            open_interest,
            volume,
            in_the_money: self.in_the_money,
            expiration,
        })
    }
}

fn count_field(symbol: &str, name: &str, value: Option<f64>) -> Result<u64, ScoutError> {
    match value {
        None => Ok(0),
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v as u64),
        Some(v) => Err(ScoutError::MalformedChain {
            reason: format!("{}: invalid {} {}", symbol, name, v),
        }),
    }
}

fn parse_expiration(value: &str) -> Result<NaiveDate, ScoutError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ScoutError::MalformedChain {
        reason: format!("invalid expiration date {:?}", value),
    })
}

/// Convert a raw chain document into a validated [`OptionChain`].
pub fn parse_chain(symbol: &str, json: &str) -> Result<OptionChain, ScoutError> {
    let doc: ChainDocument = serde_json::from_str(json).map_err(|e| ScoutError::MalformedChain {
        reason: format!("{}: {}", symbol, e),
    })?;

    let mut expirations = doc
        .expirations
        .iter()
        .map(|s| parse_expiration(s))
        .collect::<Result<Vec<_>, _>>()?;
    expirations.sort();
    expirations.dedup();

    let mut chain = OptionChain {
        symbol: symbol.to_string(),
        expirations,
        ..OptionChain::default()
    };

    for (key, record) in doc.chains {
        let expiration = parse_expiration(&key)?;
        let calls = record
            .calls
            .into_iter()
            .map(|c| c.into_contract(expiration))
            .collect::<Result<Vec<_>, _>>()?;
        let puts = record
            .puts
            .into_iter()
            .map(|c| c.into_contract(expiration))
            .collect::<Result<Vec<_>, _>>()?;
        chain.calls.insert(expiration, calls);
        chain.puts.insert(expiration, puts);
    }

    chain.validate()?;
    Ok(chain)
}

pub struct JsonChainAdapter {
    base_path: PathBuf,
}

impl JsonChainAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn chain_path(&self, symbol: &str) -> PathBuf {
        self.base_path
            .join(format!("{}_chain.json", symbol.to_uppercase()))
    }
}

impl OptionChainPort for JsonChainAdapter {
    fn fetch_chain(&self, symbol: &str) -> Result<OptionChain, ScoutError> {
        let path = self.chain_path(symbol);
        if !path.exists() {
            return Err(ScoutError::UpstreamUnavailable {
                source_name: "option chain".into(),
                reason: format!("no chain file {}", path.display()),
            });
        }
        let content = fs::read_to_string(&path)?;
        let chain = parse_chain(symbol, &content)?;
        log::debug!(
            "{}: loaded chain with {} expirations",
            symbol,
            chain.expirations.len()
        );
        Ok(chain)
    }
}
