//! RSI (Relative Strength Index) indicator.
//!
//! Gains and losses are smoothed with a first-value seeded exponential average
//! (alpha = 1/n), not Wilder's SMA seed:
//! - delta[0] = 0, delta[i] = C[i] - C[i-1]
//! - avg_gain = ewm(max(delta, 0)), avg_loss = ewm(max(-delta, 0))
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! A zero avg_loss leaves the bar undefined; the neutral fill pass turns every
//! undefined bar into 50. Series shorter than n+1 bars are 50 throughout.

use crate::domain::indicator::ema::ewm;
use crate::domain::indicator::fill::fill_value;

pub const DEFAULT_LENGTH: usize = 14;
pub const NEUTRAL_RSI: f64 = 50.0;

pub fn calculate_rsi(closes: &[f64], length: usize) -> Vec<f64> {
    if length == 0 || closes.len() < length + 1 {
        return vec![NEUTRAL_RSI; closes.len()];
    }

    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    gains.push(0.0);
    losses.push(0.0);

    for pair in closes.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let alpha = 1.0 / length as f64;
    let avg_gain = ewm(&gains, alpha);
    let avg_loss = ewm(&losses, alpha);

    let mut rsi: Vec<f64> = avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&gain, &loss)| {
            if loss == 0.0 {
                f64::NAN
            } else {
                100.0 - 100.0 / (1.0 + gain / loss)
            }
        })
        .collect();

    fill_value(&mut rsi, NEUTRAL_RSI);
    rsi
}
