//! Cash, the single open position, the trade log and the equity curve of one
//! backtest run.

use chrono::NaiveDate;

use super::position::{Position, PositionState, Trade, TradeKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    pub position: Position,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            initial_capital,
            position: Position::flat(),
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    /// Buy as many (fractional) shares as the cash balance allows.
    pub fn enter_long(&mut self, date: NaiveDate, price: f64) {
        debug_assert!(self.position.is_flat());
        let shares = self.cash / price;
        self.cash -= shares * price;
        self.position = Position {
            state: PositionState::Long,
            entry_price: price,
            shares,
        };
        self.record_trade(date, TradeKind::Buy, price, 0.0);
    }

    /// Short the cash balance's worth of shares, setting that amount aside
    /// as collateral.
    pub fn enter_short(&mut self, date: NaiveDate, price: f64) {
        debug_assert!(self.position.is_flat());
        let shares = self.cash / price;
        self.cash -= shares * price;
        self.position = Position {
            state: PositionState::Short,
            entry_price: price,
            shares,
        };
        self.record_trade(date, TradeKind::Short, price, 0.0);
    }

    /// Close the open position at `price`. Returns the realized PnL, or
    /// `None` when already flat.
    pub fn exit(&mut self, date: NaiveDate, price: f64) -> Option<f64> {
        let pos = self.position;
        let kind = match pos.state {
            PositionState::Flat => return None,
            PositionState::Long => TradeKind::Sell,
            PositionState::Short => TradeKind::Cover,
        };

        let pnl = pos.unrealized_pnl(price);
        self.cash += pos.market_value(price);
        self.position = Position::flat();
        self.record_trade(date, kind, price, pnl);
        Some(pnl)
    }

    pub fn total_equity(&self, price: f64) -> f64 {
        self.cash + self.position.market_value(price)
    }

    pub fn record_equity(&mut self, date: NaiveDate, equity: f64) {
        self.equity_curve.push(EquityPoint { date, equity });
    }

    fn record_trade(&mut self, date: NaiveDate, kind: TradeKind, price: f64, pnl: f64) {
        self.trades.push(Trade {
            date,
            kind,
            price,
            pnl,
        });
    }

    pub fn final_equity(&self) -> f64 {
        self.equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.initial_capital)
    }
}
