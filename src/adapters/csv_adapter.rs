//! CSV file ingestion adapter.
//!
//! Turns an arbitrary OHLCV export into a clean [`BarSeries`]: delimiter
//! sniffing, column-name inference, date parsing, dropping incomplete rows,
//! sorting and de-duplication (last row per timestamp wins).

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use log::{debug, warn};
use std::fs;
use std::path::Path;

use crate::domain::error::SispError;
use crate::domain::ohlcv::{Bar, BarSeries, MIN_BARS};
use crate::ports::data_port::DataPort;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];
const MIN_COLUMNS: usize = 4;
const BAD_DATE_EXAMPLES: usize = 5;

const OPEN_ALIASES: &[&str] = &["open", "o", "open price"];
const HIGH_ALIASES: &[&str] = &["high", "h", "high price"];
const LOW_ALIASES: &[&str] = &["low", "l", "low price"];
const CLOSE_ALIASES: &[&str] = &["close", "c", "last", "close price"];
const VOLUME_ALIASES: &[&str] = &[
    "volume",
    "vol",
    "total traded qty",
    "totaltradedqty",
    "trdqty",
    "qty",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%d-%m-%Y", "%Y%m%d", "%d %b %Y", "%b %d %Y",
    "%d-%b-%Y",
];

#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    pub max_upload_bytes: u64,
    pub min_bars: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        IngestConfig {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            min_bars: MIN_BARS,
        }
    }
}

pub struct CsvAdapter {
    config: IngestConfig,
}

/// Positions of the required columns within a record.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ColumnMap {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl CsvAdapter {
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    /// Ingest raw CSV bytes.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<BarSeries, SispError> {
        self.check_size(bytes.len() as u64)?;

        let text = String::from_utf8_lossy(bytes);
        let (headers, records) = sniff_and_read(&text)?;
        let columns = infer_columns(&headers)?;
        let bars = build_bars(&records, &columns)?;
        let bars = sort_and_dedup(bars);

        debug!("ingested {} bars", bars.len());
        BarSeries::new(bars, self.config.min_bars)
    }

    fn check_size(&self, size: u64) -> Result<(), SispError> {
        if size > self.config.max_upload_bytes {
            return Err(SispError::FileTooLarge {
                size,
                limit: self.config.max_upload_bytes,
            });
        }
        Ok(())
    }
}

impl DataPort for CsvAdapter {
    fn load_series(&self, source: &Path) -> Result<BarSeries, SispError> {
        let size = fs::metadata(source)?.len();
        self.check_size(size)?;
        let bytes = fs::read(source)?;
        self.parse_bytes(&bytes)
    }
}

/// Try each delimiter in turn; the first that yields a consistent table with
/// at least four columns wins.
fn sniff_and_read(text: &str) -> Result<(Vec<String>, Vec<StringRecord>), SispError> {
    for &delimiter in &DELIMITERS {
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = match rdr.headers() {
            Ok(h) if h.len() >= MIN_COLUMNS => h.iter().map(|s| s.to_string()).collect(),
            _ => continue,
        };

        match rdr.records().collect::<Result<Vec<_>, _>>() {
            Ok(records) => {
                debug!("sniffed delimiter {:?}", delimiter as char);
                return Ok((headers, records));
            }
            Err(e) => {
                debug!("delimiter {:?} rejected: {}", delimiter as char, e);
            }
        }
    }

    Err(SispError::Parse {
        reason: format!(
            "no delimiter among {:?} produced at least {} consistent columns",
            DELIMITERS.map(|d| d as char),
            MIN_COLUMNS
        ),
    })
}

fn infer_columns(headers: &[String]) -> Result<ColumnMap, SispError> {
    let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    let find = |aliases: &[&str]| {
        aliases
            .iter()
            .find_map(|alias| normalized.iter().position(|h| h == alias))
    };

    let open = find(OPEN_ALIASES);
    let high = find(HIGH_ALIASES);
    let low = find(LOW_ALIASES);
    let close = find(CLOSE_ALIASES);
    let volume = find(VOLUME_ALIASES)
        .or_else(|| normalized.iter().position(|h| h.contains("traded") && h.contains("qty")));

    let missing: Vec<String> = [
        ("open", open),
        ("high", high),
        ("low", low),
        ("close", close),
        ("volume", volume),
    ]
    .iter()
    .filter(|(_, idx)| idx.is_none())
    .map(|(name, _)| name.to_string())
    .collect();

    match (open, high, low, close, volume) {
        (Some(open), Some(high), Some(low), Some(close), Some(volume)) => {
            let date = normalized
                .iter()
                .position(|h| h.contains("date") || h.contains("time"))
                .ok_or(SispError::NoDateColumn)?;
            Ok(ColumnMap {
                date,
                open,
                high,
                low,
                close,
                volume,
            })
        }
        _ => Err(SispError::MissingColumns {
            missing,
            found: headers.to_vec(),
        }),
    }
}

fn build_bars(records: &[StringRecord], columns: &ColumnMap) -> Result<Vec<Bar>, SispError> {
    let mut bars = Vec::with_capacity(records.len());
    let mut bad_dates = Vec::new();
    let mut dropped = 0usize;

    for record in records {
        let raw_date = record.get(columns.date).unwrap_or_default();
        let Some(timestamp) = parse_timestamp(raw_date) else {
            if bad_dates.len() < BAD_DATE_EXAMPLES {
                bad_dates.push(raw_date.to_string());
            }
            continue;
        };

        let field = |idx: usize| record.get(idx).and_then(parse_number);
        match (
            field(columns.open),
            field(columns.high),
            field(columns.low),
            field(columns.close),
            field(columns.volume),
        ) {
            (Some(open), Some(high), Some(low), Some(close), Some(volume)) => bars.push(Bar {
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            }),
            _ => dropped += 1,
        }
    }

    if !bad_dates.is_empty() {
        return Err(SispError::UnparseableDates {
            examples: bad_dates,
        });
    }
    if dropped > 0 {
        warn!("dropped {} rows with missing or non-numeric values", dropped);
    }
    Ok(bars)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Parse the common timestamp spellings found in OHLCV exports.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // Unix epoch seconds
    if raw.len() >= 9 && raw.bytes().all(|b| b.is_ascii_digit()) {
        let secs: i64 = raw.parse().ok()?;
        return DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc());
    }

    None
}

/// Stable sort by timestamp, keeping the last row for each repeated timestamp.
fn sort_and_dedup(mut bars: Vec<Bar>) -> Vec<Bar> {
    bars.sort_by_key(|b| b.timestamp);

    let mut out: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(last) if last.timestamp == bar.timestamp => *last = bar,
            _ => out.push(bar),
        }
    }
    out
}
