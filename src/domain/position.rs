//! Position state and the trade log record.

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionState {
    Flat,
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub state: PositionState,
    pub entry_price: f64,
    /// Fractional share count; sizing uses the whole cash balance.
    pub shares: f64,
}

impl Position {
    pub fn flat() -> Self {
        Position {
            state: PositionState::Flat,
            entry_price: 0.0,
            shares: 0.0,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.state == PositionState::Flat
    }

    pub fn is_long(&self) -> bool {
        self.state == PositionState::Long
    }

    pub fn is_short(&self) -> bool {
        self.state == PositionState::Short
    }

    /// Profit of closing at `price`: (price − entry) × shares long,
    /// (entry − price) × shares short, 0 when flat.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        match self.state {
            PositionState::Flat => 0.0,
            PositionState::Long => (price - self.entry_price) * self.shares,
            PositionState::Short => (self.entry_price - price) * self.shares,
        }
    }

    /// Value the position contributes to equity at `price`, on top of cash.
    ///
    /// A short returns its deducted collateral (shares × entry) plus its PnL.
    pub fn market_value(&self, price: f64) -> f64 {
        match self.state {
            PositionState::Flat => 0.0,
            PositionState::Long => self.shares * price,
            PositionState::Short => self.shares * self.entry_price + self.unrealized_pnl(price),
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::flat()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeKind {
    Buy,
    Sell,
    Short,
    Cover,
}

impl TradeKind {
    pub fn is_entry(&self) -> bool {
        matches!(self, TradeKind::Buy | TradeKind::Short)
    }
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeKind::Buy => write!(f, "Buy"),
            TradeKind::Sell => write!(f, "Sell"),
            TradeKind::Short => write!(f, "Short"),
            TradeKind::Cover => write!(f, "Cover"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trade {
    pub date: NaiveDate,
    pub kind: TradeKind,
    pub price: f64,
    /// Realized PnL; always 0 for entries.
    pub pnl: f64,
}
