//! Cumulative VWAP (Volume Weighted Average Price).
//!
//! VWAP[i] = sum(typical * volume)[0..=i] / sum(volume)[0..=i]
//!
//! Bars whose cumulative volume is still zero are undefined; they take the
//! nearest defined value, forward first, then backward for a leading gap.

use crate::domain::indicator::fill::{backward_fill, forward_fill};
use crate::domain::ohlcv::Bar;

pub fn calculate_vwap(bars: &[Bar]) -> Vec<f64> {
    let mut values = Vec::with_capacity(bars.len());
    let mut cum_pv = 0.0;
    let mut cum_volume = 0.0;

    for bar in bars {
        cum_pv += bar.typical_price() * bar.volume;
        cum_volume += bar.volume;
        values.push(if cum_volume == 0.0 {
            f64::NAN
        } else {
            cum_pv / cum_volume
        });
    }

    forward_fill(&mut values);
    backward_fill(&mut values);
    values
}
