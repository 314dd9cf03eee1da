//! OHLCV bar representation and the validated bar series.

use chrono::NaiveDateTime;
use std::ops::Deref;

use crate::domain::error::SispError;

/// Minimum number of bars a series needs before it is worth analysing.
pub const MIN_BARS: usize = 60;

/// Display format for bar timestamps in every output table.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// An ascending, uniquely timestamped, finite bar series.
///
/// Ingestion normally guarantees these properties already; the constructor
/// re-checks them so a violated invariant fails loudly instead of producing
/// silently wrong indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(bars: Vec<Bar>, min_bars: usize) -> Result<Self, SispError> {
        if bars.len() < min_bars {
            return Err(SispError::InsufficientData {
                bars: bars.len(),
                minimum: min_bars,
            });
        }

        for (row, bar) in bars.iter().enumerate() {
            let prices = [
                ("open", bar.open),
                ("high", bar.high),
                ("low", bar.low),
                ("close", bar.close),
            ];
            if let Some((name, _)) = prices.iter().find(|(_, v)| !v.is_finite()) {
                return Err(SispError::InvalidInput {
                    row,
                    reason: format!("{} is missing or non-finite", name),
                });
            }
            if !bar.volume.is_finite() || bar.volume < 0.0 {
                return Err(SispError::InvalidInput {
                    row,
                    reason: format!("volume must be a non-negative number, got {}", bar.volume),
                });
            }
            if row > 0 && bar.timestamp <= bars[row - 1].timestamp {
                return Err(SispError::InvalidInput {
                    row,
                    reason: format!(
                        "timestamp {} does not follow {}",
                        bar.timestamp,
                        bars[row - 1].timestamp
                    ),
                });
            }
        }

        Ok(Self { bars })
    }
}

impl Deref for BarSeries {
    type Target = [Bar];

    fn deref(&self) -> &[Bar] {
        &self.bars
    }
}
