//! Single-position backtest engine.
//!
//! One forward pass over bars 0..N-2: a signal on bar t fills at open[t+1],
//! so the last bar only serves as the valuation mark.

use chrono::NaiveDateTime;
use log::debug;
use serde::ser::{Serialize, SerializeTuple, Serializer};

use super::indicator::IndicatorFrame;
use super::metrics::win_rate;
use super::portfolio::Portfolio;
use super::signal::{Signal, generate_signals};

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;
pub const DEFAULT_TRADES_SAMPLE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub trades_sample_size: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            trades_sample_size: DEFAULT_TRADES_SAMPLE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub side: Side,
    pub timestamp: NaiveDateTime,
    pub price: f64,
}

/// Serialized as a `[side, timestamp, price]` triple.
impl Serialize for Trade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(self.side.as_str())?;
        tuple.serialize_element(
            &self
                .timestamp
                .format(super::ohlcv::TIMESTAMP_FORMAT)
                .to_string(),
        )?;
        tuple.serialize_element(&self.price)?;
        tuple.end()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BacktestResult {
    pub final_portfolio_value: f64,
    pub n_trades: usize,
    pub win_rate: f64,
    pub trades_sample: Vec<Trade>,
}

/// Backtest with 100000 starting cash and a 10-trade sample.
pub fn safe_backtest(frame: &IndicatorFrame) -> BacktestResult {
    run_backtest(frame, &BacktestConfig::default())
}

pub fn run_backtest(frame: &IndicatorFrame, config: &BacktestConfig) -> BacktestResult {
    let signals = generate_signals(frame);
    let rows = &frame.rows;
    let mut portfolio = Portfolio::new(config.initial_capital);

    for (t, signal) in signals.iter().enumerate().take(rows.len().saturating_sub(1)) {
        let next = &rows[t + 1].bar;
        let filled = match signal {
            Signal::Buy if portfolio.is_flat() => portfolio.buy(next.timestamp, next.open),
            Signal::Sell if portfolio.is_long() => portfolio.sell(next.timestamp, next.open),
            _ => continue,
        };
        if !filled {
            debug!(
                "skipping {:?} signal at bar {}: next open {} is not a valid fill",
                signal, t, next.open
            );
        }
    }

    let final_portfolio_value = match rows.last() {
        Some(last) => portfolio.total_equity(last.bar.close),
        None => portfolio.cash,
    };

    let trades = portfolio.trades;
    let n_trades = trades.len();
    let win_rate = win_rate(&trades);
    let trades_sample = trades
        .into_iter()
        .take(config.trades_sample_size)
        .collect();

    BacktestResult {
        final_portfolio_value,
        n_trades,
        win_rate,
        trades_sample,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::IndicatorRow;
    use crate::domain::ohlcv::Bar;
    use chrono::{Duration, NaiveDate};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    /// A frame whose signals are fully controlled: MACD and EMA_10 are set
    /// so bar i produces `signals[i]`. Volume rises every bar, which keeps it
    /// above its trailing mean from bar 1 on; bar 0 can never buy.
    fn scripted_frame(signals: &[i8], opens: &[f64]) -> IndicatorFrame {
        let rows = signals
            .iter()
            .zip(opens)
            .enumerate()
            .map(|(i, (&signal, &open))| {
                let (macd, ema_10) = match signal {
                    1 => (1.0, 90.0),
                    -1 => (-1.0, 110.0),
                    _ => (0.0, 100.0),
                };
                let volume = (i + 1) as f64 * 1000.0;
                IndicatorRow {
                    bar: Bar {
                        timestamp: start() + Duration::days(i as i64),
                        open,
                        high: 101.0,
                        low: 99.0,
                        close: 100.0,
                        volume,
                    },
                    rsi: 50.0,
                    macd,
                    macd_signal: 0.0,
                    macd_hist: macd,
                    ema_10,
                    ema_100: 100.0,
                    vwap: 100.0,
                    obv: 0.0,
                    tr: 2.0,
                    atr_14: 2.0,
                }
            })
            .collect();
        IndicatorFrame { rows }
    }

    #[test]
    fn scripted_frame_produces_requested_signals() {
        let frame = scripted_frame(&[0, 1, 0, -1, 0], &[100.0; 5]);
        let signals: Vec<i8> = generate_signals(&frame).iter().map(|s| s.value()).collect();
        assert_eq!(signals, vec![0, 1, 0, -1, 0]);
    }

    #[test]
    fn no_signals_no_trades() {
        let frame = scripted_frame(&[0; 5], &[100.0; 5]);
        let result = safe_backtest(&frame);
        assert_eq!(result.n_trades, 0);
        assert_eq!(result.final_portfolio_value, 100_000.0);
        assert_eq!(result.win_rate, 0.0);
        assert!(result.trades_sample.is_empty());
    }

    #[test]
    fn single_round_trip() {
        let frame = scripted_frame(&[0, 1, 0, -1, 0], &[100.0, 100.0, 50.0, 100.0, 80.0]);
        let result = safe_backtest(&frame);

        assert_eq!(result.n_trades, 2);
        assert!((result.final_portfolio_value - 100_000.0 / 50.0 * 80.0).abs() < 1e-6);
        assert_eq!(result.win_rate, 1.0);

        let buy = &result.trades_sample[0];
        assert_eq!(buy.side, Side::Buy);
        assert_eq!(buy.timestamp, start() + Duration::days(2));
        assert_eq!(buy.price, 50.0);

        let sell = &result.trades_sample[1];
        assert_eq!(sell.side, Side::Sell);
        assert_eq!(sell.timestamp, start() + Duration::days(4));
        assert_eq!(sell.price, 80.0);
    }

    #[test]
    fn losing_round_trip() {
        let frame = scripted_frame(&[0, 1, 0, -1, 0], &[100.0, 100.0, 100.0, 100.0, 60.0]);
        let result = safe_backtest(&frame);
        assert_eq!(result.n_trades, 2);
        assert!((result.final_portfolio_value - 60_000.0).abs() < 1e-6);
        assert_eq!(result.win_rate, 0.0);
    }

    #[test]
    fn open_position_marked_at_last_close() {
        let frame = scripted_frame(&[0, 1, 0, 0], &[100.0, 100.0, 50.0, 70.0]);
        let result = safe_backtest(&frame);
        assert_eq!(result.n_trades, 1);
        // 2000 units at close 100
        assert!((result.final_portfolio_value - 200_000.0).abs() < 1e-6);
        assert_eq!(result.win_rate, 0.0);
    }

    #[test]
    fn invalid_fill_is_skipped_not_retried() {
        // buy signal on bar 1 but open[2] == 0; buy signal on bar 2 fills at open[3]
        let frame = scripted_frame(&[0, 1, 1, 0], &[100.0, 100.0, 0.0, 40.0]);
        let result = safe_backtest(&frame);
        assert_eq!(result.n_trades, 1);
        assert_eq!(result.trades_sample[0].price, 40.0);
    }

    #[test]
    fn missing_fill_leaves_state_unchanged() {
        let frame = scripted_frame(&[0, 1, 0, 0], &[100.0, 100.0, f64::NAN, 100.0]);
        let result = safe_backtest(&frame);
        assert_eq!(result.n_trades, 0);
        assert_eq!(result.final_portfolio_value, 100_000.0);
    }

    #[test]
    fn signal_on_last_bar_is_ignored() {
        let frame = scripted_frame(&[0, 0, 1], &[100.0; 3]);
        let result = safe_backtest(&frame);
        assert_eq!(result.n_trades, 0);
    }

    #[test]
    fn repeated_buy_signals_hold_one_position() {
        let frame = scripted_frame(&[0, 1, 1, 1, 0], &[100.0, 100.0, 50.0, 25.0, 10.0]);
        let result = safe_backtest(&frame);
        assert_eq!(result.n_trades, 1);
        assert_eq!(result.trades_sample[0].price, 50.0);
    }

    #[test]
    fn sell_signal_while_flat_is_noop() {
        let frame = scripted_frame(&[-1, -1, 0], &[100.0; 3]);
        let result = safe_backtest(&frame);
        assert_eq!(result.n_trades, 0);
        assert_eq!(result.final_portfolio_value, 100_000.0);
    }

    #[test]
    fn trades_sample_is_capped() {
        let signals: Vec<i8> = (0..31)
            .map(|i| match i {
                0 => 0,
                i if i % 2 == 1 => 1,
                _ => -1,
            })
            .collect();
        let frame = scripted_frame(&signals, &[100.0; 31]);
        let result = safe_backtest(&frame);
        assert_eq!(result.n_trades, 29);
        assert_eq!(result.trades_sample.len(), 10);
    }

    #[test]
    fn custom_config() {
        let frame = scripted_frame(&[0, 1, 0, -1, 0], &[100.0, 100.0, 10.0, 100.0, 20.0]);
        let config = BacktestConfig {
            initial_capital: 500.0,
            trades_sample_size: 1,
        };
        let result = run_backtest(&frame, &config);
        assert_eq!(result.n_trades, 2);
        assert_eq!(result.trades_sample.len(), 1);
        assert!((result.final_portfolio_value - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn empty_frame() {
        let result = safe_backtest(&IndicatorFrame::default());
        assert_eq!(result.n_trades, 0);
        assert_eq!(result.final_portfolio_value, 100_000.0);
    }

    #[test]
    fn result_serializes_trade_triples() {
        let frame = scripted_frame(&[0, 1, 0, 0], &[100.0, 100.0, 50.0, 70.0]);
        let json = serde_json::to_value(safe_backtest(&frame)).unwrap();
        assert_eq!(json["n_trades"], 1);
        assert_eq!(
            json["trades_sample"][0],
            serde_json::json!(["buy", "2024-01-03 00:00:00", 50.0])
        );
    }
}
