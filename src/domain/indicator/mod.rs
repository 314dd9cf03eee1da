//! Technical indicator engine.
//!
//! This module provides the types for the indicator-extended series:
//! - `IndicatorType`: indicator identity + parameters; its `Display` is the column name
//! - `IndicatorRow`: one bar with its indicator values attached
//! - `IndicatorFrame`: the full series, same length and order as the input bars
//!
//! `compute_all_indicators` is a pure function of the bars. Undefined values
//! are `f64::NAN` and serialize as `null`.

pub mod atr;
pub mod ema;
pub mod fill;
pub mod macd;
pub mod obv;
pub mod rolling;
pub mod rsi;
pub mod vwap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

use crate::domain::ohlcv::Bar;

pub const EMA_SHORT: usize = 10;
pub const EMA_LONG: usize = 100;

/// Base columns carried over from the bars, in output order.
pub const BASE_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

/// Indicator columns appended to every row, in output order.
pub const INDICATOR_COLUMNS: [IndicatorType; 10] = [
    IndicatorType::Rsi(rsi::DEFAULT_LENGTH),
    IndicatorType::MacdLine,
    IndicatorType::MacdSignal,
    IndicatorType::MacdHistogram,
    IndicatorType::Ema(EMA_SHORT),
    IndicatorType::Ema(EMA_LONG),
    IndicatorType::Vwap,
    IndicatorType::Obv,
    IndicatorType::TrueRange,
    IndicatorType::Atr(atr::DEFAULT_PERIOD),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Rsi(usize),
    MacdLine,
    MacdSignal,
    MacdHistogram,
    Ema(usize),
    Vwap,
    Obv,
    TrueRange,
    Atr(usize),
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Rsi(_) => write!(f, "RSI"),
            IndicatorType::MacdLine => write!(f, "MACD"),
            IndicatorType::MacdSignal => write!(f, "MACD_signal"),
            IndicatorType::MacdHistogram => write!(f, "MACD_hist"),
            IndicatorType::Ema(period) => write!(f, "EMA_{}", period),
            IndicatorType::Vwap => write!(f, "VWAP"),
            IndicatorType::Obv => write!(f, "OBV"),
            IndicatorType::TrueRange => write!(f, "TR"),
            IndicatorType::Atr(period) => write!(f, "ATR_{}", period),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub bar: Bar,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub ema_10: f64,
    pub ema_100: f64,
    pub vwap: f64,
    pub obv: f64,
    pub tr: f64,
    pub atr_14: f64,
}

impl IndicatorRow {
    /// Value for an entry of [`INDICATOR_COLUMNS`].
    pub fn get(&self, indicator: IndicatorType) -> f64 {
        match indicator {
            IndicatorType::Rsi(_) => self.rsi,
            IndicatorType::MacdLine => self.macd,
            IndicatorType::MacdSignal => self.macd_signal,
            IndicatorType::MacdHistogram => self.macd_hist,
            IndicatorType::Ema(EMA_LONG) => self.ema_100,
            IndicatorType::Ema(_) => self.ema_10,
            IndicatorType::Vwap => self.vwap,
            IndicatorType::Obv => self.obv,
            IndicatorType::TrueRange => self.tr,
            IndicatorType::Atr(_) => self.atr_14,
        }
    }

    /// Base and indicator values in [`IndicatorFrame::columns`] order.
    pub fn values(&self) -> Vec<f64> {
        let bar = &self.bar;
        let mut values = vec![bar.open, bar.high, bar.low, bar.close, bar.volume];
        values.extend(INDICATOR_COLUMNS.iter().map(|&ind| self.get(ind)));
        values
    }
}

/// `None` for the missing sentinel, so it serializes as `null`.
pub fn finite_or_none(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

impl Serialize for IndicatorRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let columns = IndicatorFrame::columns();
        let mut map = serializer.serialize_map(Some(columns.len() + 1))?;
        map.serialize_entry("datetime", &self.bar.timestamp_string())?;
        for (name, value) in columns.iter().zip(self.values()) {
            map.serialize_entry(name, &finite_or_none(value))?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorFrame {
    pub rows: Vec<IndicatorRow>,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names in output order, excluding the timestamp.
    pub fn columns() -> Vec<String> {
        BASE_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(INDICATOR_COLUMNS.iter().map(|ind| ind.to_string()))
            .collect()
    }

    /// The base bar columns, without indicators.
    pub fn bars(&self) -> Vec<Bar> {
        self.rows.iter().map(|row| row.bar.clone()).collect()
    }

    /// Number of missing values in an indicator column.
    pub fn missing_count(&self, indicator: IndicatorType) -> usize {
        self.rows
            .iter()
            .filter(|row| row.get(indicator).is_nan())
            .count()
    }
}

/// Compute every indicator column for `bars`.
///
/// Infinite results become the `NaN` missing sentinel; rows are never dropped.
pub fn compute_all_indicators(bars: &[Bar]) -> IndicatorFrame {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let mut rsi = rsi::calculate_rsi(&closes, rsi::DEFAULT_LENGTH);
    let macd::MacdOutput {
        line: mut macd_line,
        signal: mut macd_signal,
        histogram: mut macd_hist,
    } = macd::calculate_macd_default(&closes);
    let mut ema_10 = ema::calculate_ema(&closes, EMA_SHORT);
    let mut ema_100 = ema::calculate_ema(&closes, EMA_LONG);
    let mut vwap = vwap::calculate_vwap(bars);
    let mut obv = obv::calculate_obv(bars);
    let mut tr = atr::calculate_true_range(bars);
    let mut atr_14 = atr::calculate_atr(&tr, atr::DEFAULT_PERIOD);

    for column in [
        &mut rsi,
        &mut macd_line,
        &mut macd_signal,
        &mut macd_hist,
        &mut ema_10,
        &mut ema_100,
        &mut vwap,
        &mut obv,
        &mut tr,
        &mut atr_14,
    ] {
        fill::replace_non_finite(column);
    }

    let rows = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorRow {
            bar: bar.clone(),
            rsi: rsi[i],
            macd: macd_line[i],
            macd_signal: macd_signal[i],
            macd_hist: macd_hist[i],
            ema_10: ema_10[i],
            ema_100: ema_100[i],
            vwap: vwap[i],
            obv: obv[i],
            tr: tr[i],
            atr_14: atr_14[i],
        })
        .collect();

    IndicatorFrame { rows }
}
