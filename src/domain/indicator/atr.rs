//! True Range and ATR (Average True Range).
//!
//! TR[0] = high[0] - low[0] (no previous close), TR[i] = bar.true_range(C[i-1]).
//! ATR is a plain trailing mean of TR with minimum-period averaging, so the
//! first bars average whatever history exists instead of being undefined.

use crate::domain::indicator::rolling::rolling_mean;
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_true_range(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect()
}

pub fn calculate_atr(true_range: &[f64], period: usize) -> Vec<f64> {
    rolling_mean(true_range, period)
}
