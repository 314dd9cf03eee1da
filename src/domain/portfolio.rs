//! Single-asset portfolio state for one backtest pass.

use chrono::NaiveDateTime;

use super::backtest::{Side, Trade};

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    /// Units of the asset held; never negative (no shorting).
    pub position: f64,
    pub trades: Vec<Trade>,
}

/// A fill price is usable unless it is missing or non-positive.
pub fn is_valid_fill(price: f64) -> bool {
    !price.is_nan() && price > 0.0
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            position: 0.0,
            trades: Vec::new(),
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position == 0.0
    }

    pub fn is_long(&self) -> bool {
        self.position > 0.0
    }

    /// Convert all cash into units at `price`. Returns false, leaving the
    /// state untouched, if already long or the price is not a valid fill.
    pub fn buy(&mut self, timestamp: NaiveDateTime, price: f64) -> bool {
        if !self.is_flat() || !is_valid_fill(price) {
            return false;
        }
        self.position = self.cash / price;
        self.cash = 0.0;
        self.record_trade(Side::Buy, timestamp, price);
        true
    }

    /// Liquidate the whole position at `price`. Returns false, leaving the
    /// state untouched, if flat or the price is not a valid fill.
    pub fn sell(&mut self, timestamp: NaiveDateTime, price: f64) -> bool {
        if !self.is_long() || !is_valid_fill(price) {
            return false;
        }
        self.cash = self.position * price;
        self.position = 0.0;
        self.record_trade(Side::Sell, timestamp, price);
        true
    }

    fn record_trade(&mut self, side: Side, timestamp: NaiveDateTime, price: f64) {
        self.trades.push(Trade {
            side,
            timestamp,
            price,
        });
    }

    /// Cash plus the position marked at `price`; a flat book ignores `price`.
    pub fn total_equity(&self, price: f64) -> f64 {
        if self.is_flat() {
            self.cash
        } else {
            self.cash + self.position * price
        }
    }
}
