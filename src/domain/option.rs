//! Option contracts, chain snapshots and scored candidates.

use crate::domain::error::ScoutError;
use crate::domain::signal::Directive;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// The contract side expressing `directive`; `None` for `Hold`.
    pub fn for_directive(directive: Directive) -> Option<OptionType> {
        match directive {
            Directive::Call => Some(OptionType::Call),
            Directive::Put => Some(OptionType::Put),
            Directive::Hold => None,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "Call"),
            OptionType::Put => write!(f, "Put"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionContract {
    pub contract_symbol: String,
    pub strike: f64,
    pub last_price: f64,
    pub implied_volatility: f64,
    pub open_interest: u64,
    pub volume: u64,
    pub in_the_money: bool,
    pub expiration: NaiveDate,
}

impl OptionContract {
    /// Cost of one contract (100 shares) at the last traded premium.
    pub fn contract_cost(&self) -> f64 {
        self.last_price * 100.0
    }

    fn validate(&self) -> Result<(), ScoutError> {
        let malformed = |reason: String| ScoutError::MalformedChain {
            reason: format!("{}: {}", self.contract_symbol, reason),
        };

        if self.contract_symbol.trim().is_empty() {
            return Err(ScoutError::MalformedChain {
                reason: "contract with empty symbol".into(),
            });
        }
        if !self.strike.is_finite() || self.strike <= 0.0 {
            return Err(malformed(format!("invalid strike {}", self.strike)));
        }
        if !self.last_price.is_finite() || self.last_price < 0.0 {
            return Err(malformed(format!("invalid last price {}", self.last_price)));
        }
        if !self.implied_volatility.is_finite() || self.implied_volatility < 0.0 {
            return Err(malformed(format!(
                "invalid implied volatility {}",
                self.implied_volatility
            )));
        }
        Ok(())
    }
}

/// Snapshot of an option chain: available expirations plus calls and puts
/// grouped by expiration.
#[derive(Debug, Clone, Default)]
pub struct OptionChain {
    pub symbol: String,
    pub expirations: Vec<NaiveDate>,
    pub calls: BTreeMap<NaiveDate, Vec<OptionContract>>,
    pub puts: BTreeMap<NaiveDate, Vec<OptionContract>>,
}

impl OptionChain {
    pub fn contracts(&self, option_type: OptionType, expiration: NaiveDate) -> &[OptionContract] {
        let side = match option_type {
            OptionType::Call => &self.calls,
            OptionType::Put => &self.puts,
        };
        side.get(&expiration).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Structural checks: sorted unique expirations, every grouped contract
    /// belongs to a listed expiration and carries sane numeric fields.
    pub fn validate(&self) -> Result<(), ScoutError> {
        if !self.expirations.windows(2).all(|w| w[0] < w[1]) {
            return Err(ScoutError::MalformedChain {
                reason: "expirations not strictly ascending".into(),
            });
        }

        for (expiration, contracts) in self.calls.iter().chain(self.puts.iter()) {
            if self.expirations.binary_search(expiration).is_err() {
                return Err(ScoutError::MalformedChain {
                    reason: format!("contracts for unlisted expiration {}", expiration),
                });
            }
            for contract in contracts {
                if contract.expiration != *expiration {
                    return Err(ScoutError::MalformedChain {
                        reason: format!(
                            "{} expires {} but is grouped under {}",
                            contract.contract_symbol, contract.expiration, expiration
                        ),
                    });
                }
                contract.validate()?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Classify by relative strike distance from the underlying.
    pub fn from_distance(distance_pct: f64) -> RiskLevel {
        if distance_pct < 0.05 {
            RiskLevel::Low
        } else if distance_pct < 0.15 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low Risk"),
            RiskLevel::Medium => write!(f, "Medium Risk"),
            RiskLevel::High => write!(f, "High Risk"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredContract {
    pub contract: OptionContract,
    pub option_type: OptionType,
    pub delta: f64,
    pub distance_pct: f64,
    pub risk_level: RiskLevel,
    pub reasoning: String,
    pub breakeven: f64,
    /// |delta| expressed as a percentage.
    pub probability_of_profit: f64,
}
