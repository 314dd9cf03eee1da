#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use sisp::domain::error::SispError;
pub use sisp::domain::ohlcv::{Bar, BarSeries, MIN_BARS};
use sisp::ports::data_port::DataPort;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct MockDataPort {
    pub data: HashMap<PathBuf, Vec<Bar>>,
    pub errors: HashMap<PathBuf, String>,
    pub min_bars: usize,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            min_bars: MIN_BARS,
        }
    }

    pub fn with_bars(mut self, source: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(PathBuf::from(source), bars);
        self
    }

    pub fn with_error(mut self, source: &str, reason: &str) -> Self {
        self.errors.insert(PathBuf::from(source), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn load_series(&self, source: &Path) -> Result<BarSeries, SispError> {
        if let Some(reason) = self.errors.get(source) {
            return Err(SispError::Parse {
                reason: reason.clone(),
            });
        }
        let bars = self.data.get(source).cloned().unwrap_or_default();
        BarSeries::new(bars, self.min_bars)
    }
}

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn make_bar(day: i64, close: f64, volume: f64) -> Bar {
    Bar {
        timestamp: start_time() + Duration::days(day),
        open: close - 0.5,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume,
    }
}

/// Daily bars following a slow sine wave on a rising trend, with volume
/// cycling so the volume filter sometimes passes.
pub fn generate_bars(count: usize, start_price: f64) -> Vec<Bar> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            let close = start_price + t * 0.1 + (t / 6.0).sin() * 5.0;
            let volume = 1000.0 + ((i * 37) % 11) as f64 * 150.0;
            make_bar(i as i64, close, volume)
        })
        .collect()
}

/// Constant-price bars: MACD and its signal stay at zero, so no signal fires.
pub fn flat_bars(count: usize, price: f64) -> Vec<Bar> {
    (0..count).map(|i| make_bar(i as i64, price, 1000.0)).collect()
}

pub fn series(bars: Vec<Bar>) -> BarSeries {
    BarSeries::new(bars, MIN_BARS).unwrap()
}

/// Render bars as a CSV file body with the given delimiter.
pub fn bars_to_csv(bars: &[Bar], delimiter: char) -> String {
    let d = delimiter;
    let mut out = format!("Date{d}Open{d}High{d}Low{d}Close{d}Volume\n");
    for bar in bars {
        out.push_str(&format!(
            "{}{d}{}{d}{}{d}{}{d}{}{d}{}\n",
            bar.timestamp_string(),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        ));
    }
    out
}

pub fn write_temp_csv(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
