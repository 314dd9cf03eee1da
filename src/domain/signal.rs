//! Per-bar trading signal derivation.
//!
//! Buy:  MACD > MACD_signal && close > EMA_10 && volume > trailing mean volume
//! Sell: MACD < MACD_signal && close < EMA_10
//! Otherwise flat. The two conditions are mutually exclusive on MACD, and a
//! missing (`NaN`) input compares false everywhere, giving a flat bar.

use crate::domain::indicator::IndicatorFrame;
use crate::domain::indicator::rolling::rolling_mean;

/// Trailing window for the volume filter.
pub const VOLUME_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Sell,
    Flat,
    Buy,
}

impl Signal {
    pub fn value(self) -> i8 {
        match self {
            Signal::Sell => -1,
            Signal::Flat => 0,
            Signal::Buy => 1,
        }
    }
}

pub fn generate_signals(frame: &IndicatorFrame) -> Vec<Signal> {
    let volumes: Vec<f64> = frame.rows.iter().map(|r| r.bar.volume).collect();
    let mean_volume = rolling_mean(&volumes, VOLUME_WINDOW);

    frame
        .rows
        .iter()
        .zip(mean_volume)
        .map(|(row, mean_volume)| {
            let close = row.bar.close;
            if row.macd > row.macd_signal && close > row.ema_10 && row.bar.volume > mean_volume {
                Signal::Buy
            } else if row.macd < row.macd_signal && close < row.ema_10 {
                Signal::Sell
            } else {
                Signal::Flat
            }
        })
        .collect()
}
