//! Trade statistics.

use super::backtest::{Side, Trade};

/// Consecutive (entry, exit) pairs in log order; a trailing unmatched trade
/// is left out.
pub fn round_trips(trades: &[Trade]) -> impl Iterator<Item = (&Trade, &Trade)> {
    trades.chunks_exact(2).map(|pair| (&pair[0], &pair[1]))
}

/// Round trips that bought and then sold higher.
pub fn count_wins(trades: &[Trade]) -> usize {
    round_trips(trades)
        .filter(|(entry, exit)| {
            entry.side == Side::Buy && exit.side == Side::Sell && exit.price > entry.price
        })
        .count()
}

/// wins / (n_trades / 2) for two or more trades, otherwise 0.
///
/// The denominator is the raw trade count halved, so an open trailing buy
/// adds half a round trip to it.
pub fn win_rate(trades: &[Trade]) -> f64 {
    let n_trades = trades.len();
    if n_trades < 2 {
        return 0.0;
    }
    count_wins(trades) as f64 / (n_trades as f64 / 2.0)
}
