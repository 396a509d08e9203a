#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use optscout::domain::error::ScoutError;
pub use optscout::domain::ohlcv::OhlcvBar;
use optscout::domain::option::{OptionChain, OptionContract, OptionType};
use optscout::domain::sentiment::{SentimentSignal, SentimentSource};
use optscout::ports::data_port::DataPort;
use optscout::ports::option_chain_port::OptionChainPort;
use optscout::ports::sentiment_port::SentimentPort;
use std::cell::Cell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, ScoutError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ScoutError::UpstreamUnavailable {
                source_name: "prices".into(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScoutError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

/// Chain port that counts fetches; symbols without a chain are unavailable.
pub struct MockChainPort {
    pub chains: HashMap<String, OptionChain>,
    pub fetches: Cell<usize>,
}

impl MockChainPort {
    pub fn new() -> Self {
        Self {
            chains: HashMap::new(),
            fetches: Cell::new(0),
        }
    }

    pub fn with_chain(mut self, chain: OptionChain) -> Self {
        self.chains.insert(chain.symbol.clone(), chain);
        self
    }
}

impl OptionChainPort for MockChainPort {
    fn fetch_chain(&self, symbol: &str) -> Result<OptionChain, ScoutError> {
        self.fetches.set(self.fetches.get() + 1);
        self.chains
            .get(symbol)
            .cloned()
            .ok_or_else(|| ScoutError::UpstreamUnavailable {
                source_name: "option chain".into(),
                reason: format!("no chain for {}", symbol),
            })
    }
}

pub struct MockSentimentPort {
    pub source: SentimentSource,
    pub score: Option<f64>,
}

impl MockSentimentPort {
    pub fn scoring(source: SentimentSource, score: f64) -> Self {
        Self {
            source,
            score: Some(score),
        }
    }

    /// A provider that always fails.
    pub fn failing(source: SentimentSource) -> Self {
        Self {
            source,
            score: None,
        }
    }
}

impl SentimentPort for MockSentimentPort {
    fn source(&self) -> SentimentSource {
        self.source
    }

    fn fetch_sentiment(&self, _symbol: &str) -> Result<SentimentSignal, ScoutError> {
        match self.score {
            Some(s) => Ok(SentimentSignal::present(self.source, s)),
            None => Err(ScoutError::UpstreamUnavailable {
                source_name: self.source.to_string(),
                reason: "rate limit exceeded".into(),
            }),
        }
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn make_bar(symbol: &str, date: NaiveDate, open: f64, close: f64) -> OhlcvBar {
    OhlcvBar {
        symbol: symbol.to_string(),
        date,
        open,
        high: open.max(close) + 1.0,
        low: (open.min(close) - 1.0).max(0.01),
        close,
        volume: 10_000,
    }
}

/// Daily bars from `start`, alternating a rise of `up` and a fall of `down`.
///
/// The alternation keeps Wilder's RSI near `100 * up / (up + down)`.
pub fn zigzag_bars(
    symbol: &str,
    start: NaiveDate,
    count: usize,
    start_price: f64,
    up: f64,
    down: f64,
) -> Vec<OhlcvBar> {
    let mut bars = Vec::with_capacity(count);
    let mut close = start_price;
    for i in 0..count {
        let open = close;
        if i > 0 {
            close += if i % 2 == 1 { up } else { -down };
        }
        bars.push(make_bar(symbol, start + Duration::days(i as i64), open, close));
    }
    bars
}

pub const START: &str = "2023-01-01";

/// Uptrend with RSI in the 50s: bullish at every complete bar.
pub fn bullish_bars(symbol: &str, count: usize) -> Vec<OhlcvBar> {
    zigzag_bars(symbol, date(START), count, 100.0, 2.0, 1.5)
}

/// Downtrend with RSI in the 40s: bearish at every complete bar.
pub fn bearish_bars(symbol: &str, count: usize) -> Vec<OhlcvBar> {
    zigzag_bars(symbol, date(START), count, 200.0, 1.5, 2.0)
}

/// Steep uptrend with RSI above 70: neither bullish nor bearish.
pub fn overbought_bars(symbol: &str, count: usize) -> Vec<OhlcvBar> {
    zigzag_bars(symbol, date(START), count, 100.0, 2.0, 0.5)
}

pub fn contract(
    symbol: &str,
    strike: f64,
    last_price: f64,
    open_interest: u64,
    in_the_money: bool,
    expiration: NaiveDate,
) -> OptionContract {
    OptionContract {
        contract_symbol: symbol.to_string(),
        strike,
        last_price,
        implied_volatility: 0.3,
        open_interest,
        volume: open_interest / 10,
        in_the_money,
        expiration,
    }
}

/// Chain with a single side populated for `expiration`, plus empty listed
/// expirations too close and too far to matter.
pub fn chain_with(
    symbol: &str,
    option_type: OptionType,
    expiration: NaiveDate,
    contracts: Vec<OptionContract>,
    extra_expirations: &[NaiveDate],
) -> OptionChain {
    let mut expirations: Vec<NaiveDate> = extra_expirations.to_vec();
    expirations.push(expiration);
    expirations.sort();
    expirations.dedup();

    let mut chain = OptionChain {
        symbol: symbol.to_string(),
        expirations,
        ..OptionChain::default()
    };
    match option_type {
        OptionType::Call => chain.calls.insert(expiration, contracts),
        OptionType::Put => chain.puts.insert(expiration, contracts),
    };
    chain
}

/// Half-dollar strike nearest `spot * factor`.
pub fn strike_near(spot: f64, factor: f64) -> f64 {
    (spot * factor * 2.0).round() / 2.0
}
