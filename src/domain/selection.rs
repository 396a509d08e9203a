//! Option contract selection: expiration choice, delta scoring, eligibility
//! filtering and liquidity ranking.

use crate::domain::error::ScoutError;
use crate::domain::option::{OptionChain, OptionContract, OptionType, RiskLevel, ScoredContract};
use crate::domain::pricing::{delta, year_fraction};
use crate::domain::signal::Directive;
use chrono::NaiveDate;

pub const MIN_DAYS_TO_EXPIRY: i64 = 21;
pub const MAX_PREFERRED_DAYS_TO_EXPIRY: i64 = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionConfig {
    /// Budget per contract, compared against premium × 100.
    pub max_cost: f64,
    pub risk_free_rate: f64,
    pub min_abs_delta: f64,
    /// Preferred maximum |strike − spot| / spot.
    pub proximity_band: f64,
    pub max_results: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        SelectionConfig {
            max_cost: 20.0,
            risk_free_rate: 0.045,
            min_abs_delta: 0.15,
            proximity_band: 0.15,
            max_results: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// The directive was `Hold`.
    NotActionable,
    NoValidExpiration,
    NoEligibleContract,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Found {
        expiration: NaiveDate,
        contracts: Vec<ScoredContract>,
    },
    Empty(EmptyReason),
}

impl Selection {
    pub fn is_found(&self) -> bool {
        matches!(self, Selection::Found { .. })
    }

    pub fn contracts(&self) -> &[ScoredContract] {
        match self {
            Selection::Found { contracts, .. } => contracts,
            Selection::Empty(_) => &[],
        }
    }

    /// Turn an empty selection into the matching error for callers that
    /// require a contract.
    pub fn require(self, symbol: &str) -> Result<(NaiveDate, Vec<ScoredContract>), ScoutError> {
        match self {
            Selection::Found {
                expiration,
                contracts,
            } => Ok((expiration, contracts)),
            Selection::Empty(EmptyReason::NoValidExpiration) => Err(ScoutError::NoValidExpiration {
                symbol: symbol.to_string(),
            }),
            Selection::Empty(_) => Err(ScoutError::NoEligibleContract {
                symbol: symbol.to_string(),
            }),
        }
    }
}

/// Earliest expiration between 3 and ~7 weeks out, else the earliest at least
/// 3 weeks out.
pub fn select_expiration(expirations: &[NaiveDate], as_of: NaiveDate) -> Option<NaiveDate> {
    let far_enough: Vec<(NaiveDate, i64)> = expirations
        .iter()
        .map(|&exp| (exp, (exp - as_of).num_days()))
        .filter(|&(_, days)| days >= MIN_DAYS_TO_EXPIRY)
        .collect();

    far_enough
        .iter()
        .filter(|&&(_, days)| days <= MAX_PREFERRED_DAYS_TO_EXPIRY)
        .map(|&(exp, _)| exp)
        .min()
        .or_else(|| far_enough.iter().map(|&(exp, _)| exp).min())
}

/// Annotate one contract. Rows are independent of each other.
pub fn score_contract(
    contract: &OptionContract,
    option_type: OptionType,
    spot: f64,
    time: f64,
    risk_free_rate: f64,
) -> ScoredContract {
    let delta = delta(
        spot,
        contract.strike,
        time,
        risk_free_rate,
        contract.implied_volatility,
        option_type,
    );
    let distance_pct = (contract.strike - spot).abs() / spot;
    let risk_level = RiskLevel::from_distance(distance_pct);
    let breakeven = match option_type {
        OptionType::Call => contract.strike + contract.last_price,
        OptionType::Put => contract.strike - contract.last_price,
    };
    let reasoning = format!(
        "High Liquidity (OI: {}). {} play ({:.1}% OTM).",
        contract.open_interest,
        risk_level,
        distance_pct * 100.0
    );

    ScoredContract {
        contract: contract.clone(),
        option_type,
        delta,
        distance_pct,
        risk_level,
        reasoning,
        breakeven,
        probability_of_profit: delta.abs() * 100.0,
    }
}

/// Rank contracts expressing `directive` from `chain`.
///
/// Fails only on malformed input; an empty outcome is `Selection::Empty`.
pub fn find_contracts(
    directive: Directive,
    chain: &OptionChain,
    spot: f64,
    as_of: NaiveDate,
    config: &SelectionConfig,
) -> Result<Selection, ScoutError> {
    chain.validate()?;
    if !spot.is_finite() || spot <= 0.0 {
        return Err(ScoutError::MalformedInput {
            reason: format!("invalid underlying price {}", spot),
        });
    }

    let Some(option_type) = OptionType::for_directive(directive) else {
        return Ok(Selection::Empty(EmptyReason::NotActionable));
    };

    let Some(expiration) = select_expiration(&chain.expirations, as_of) else {
        log::debug!("{}: no expiration {}+ days out", chain.symbol, MIN_DAYS_TO_EXPIRY);
        return Ok(Selection::Empty(EmptyReason::NoValidExpiration));
    };

    let time = year_fraction((expiration - as_of).num_days());

    let eligible: Vec<ScoredContract> = chain
        .contracts(option_type, expiration)
        .iter()
        .filter(|c| !c.in_the_money && c.contract_cost() <= config.max_cost)
        .map(|c| score_contract(c, option_type, spot, time, config.risk_free_rate))
        .filter(|s| s.delta.abs() >= config.min_abs_delta)
        .collect();

    if eligible.is_empty() {
        log::debug!(
            "{}: no {} contract for {} within budget {:.2}",
            chain.symbol,
            option_type,
            expiration,
            config.max_cost
        );
        return Ok(Selection::Empty(EmptyReason::NoEligibleContract));
    }

    let (near, far): (Vec<ScoredContract>, Vec<ScoredContract>) = eligible
        .into_iter()
        .partition(|s| s.distance_pct <= config.proximity_band);
    let mut pool = if near.is_empty() { far } else { near };

    pool.sort_by(|a, b| b.contract.open_interest.cmp(&a.contract.open_interest));
    pool.truncate(config.max_results);

    log::debug!(
        "{}: {} {} candidates for {}",
        chain.symbol,
        pool.len(),
        option_type,
        expiration
    );

    Ok(Selection::Found {
        expiration,
        contracts: pool,
    })
}
