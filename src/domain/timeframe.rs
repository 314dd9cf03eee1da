//! Bar interval inference from timestamp spacing.

use crate::domain::ohlcv::Bar;

pub const UNKNOWN_TIMEFRAME: &str = "unknown";

const KNOWN_TIMEFRAMES: [(i64, &str); 8] = [
    (60, "1m"),
    (5 * 60, "5m"),
    (15 * 60, "15m"),
    (30 * 60, "30m"),
    (60 * 60, "1h"),
    (4 * 60 * 60, "4h"),
    (24 * 60 * 60, "1d"),
    (7 * 24 * 60 * 60, "1w"),
];

/// Label for the median gap between consecutive bars, or `"unknown"` when
/// there are fewer than two bars or the gap matches no standard interval.
///
/// The median keeps weekend and holiday gaps in daily data from skewing the
/// result.
pub fn infer_timeframe(bars: &[Bar]) -> &'static str {
    let mut gaps: Vec<i64> = bars
        .windows(2)
        .map(|pair| (pair[1].timestamp - pair[0].timestamp).num_seconds())
        .collect();
    if gaps.is_empty() {
        return UNKNOWN_TIMEFRAME;
    }

    gaps.sort_unstable();
    let median = gaps[gaps.len() / 2];

    KNOWN_TIMEFRAMES
        .iter()
        .find(|(seconds, _)| *seconds == median)
        .map_or(UNKNOWN_TIMEFRAME, |(_, label)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn bars_at(times: &[NaiveDateTime]) -> Vec<Bar> {
        times
            .iter()
            .map(|&timestamp| Bar {
                timestamp,
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                volume: 1.0,
            })
            .collect()
    }

    fn spaced(count: i64, step: Duration) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let times: Vec<NaiveDateTime> = (0..count).map(|i| start + step * i as i32).collect();
        bars_at(&times)
    }

    #[test]
    fn hourly() {
        assert_eq!(infer_timeframe(&spaced(10, Duration::hours(1))), "1h");
    }

    #[test]
    fn five_minutes() {
        assert_eq!(infer_timeframe(&spaced(10, Duration::minutes(5))), "5m");
    }

    #[test]
    fn daily_with_weekend_gaps() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        // Mon-Fri for two weeks
        let times: Vec<NaiveDateTime> = [0, 1, 2, 3, 4, 7, 8, 9, 10, 11]
            .iter()
            .map(|&d| (start + Duration::days(d)).and_hms_opt(0, 0, 0).unwrap())
            .collect();
        assert_eq!(infer_timeframe(&bars_at(&times)), "1d");
    }

    #[test]
    fn irregular_is_unknown() {
        assert_eq!(infer_timeframe(&spaced(10, Duration::seconds(7))), "unknown");
    }

    #[test]
    fn single_bar_is_unknown() {
        assert_eq!(infer_timeframe(&spaced(1, Duration::hours(1))), "unknown");
    }
}
