//! OBV (On-Balance Volume) indicator implementation.

use crate::domain::ohlcv::Bar;

/// Calculate OBV (On-Balance Volume).
///
/// Each bar contributes +volume when close[i] > close[i-1] and -volume
/// otherwise, so an unchanged close subtracts.
///
/// The first bar has no previous close; its change counts as 0 and therefore
/// contributes -volume[0]. Downstream consumers rely on this exact series, so
/// the convention is kept even though OBV[0] = -volume[0] is unusual.
pub fn calculate_obv(bars: &[Bar]) -> Vec<f64> {
    let mut values = Vec::with_capacity(bars.len());
    let mut obv = 0.0;
    let mut prev_close: Option<f64> = None;

    for bar in bars {
        let change = prev_close.map_or(0.0, |prev| bar.close - prev);
        if change > 0.0 {
            obv += bar.volume;
        } else {
            obv -= bar.volume;
        }
        prev_close = Some(bar.close);
        values.push(obv);
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bar(day: u32, close: f64, volume: f64) -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }

    #[test]
    fn obv_first_bar_is_negative_volume() {
        let obv = calculate_obv(&[make_bar(1, 100.0, 1000.0)]);
        assert_eq!(obv, vec![-1000.0]);
    }

    #[test]
    fn obv_adds_volume_on_up_bar() {
        let obv = calculate_obv(&[make_bar(1, 100.0, 1000.0), make_bar(2, 105.0, 500.0)]);
        assert!((obv[1] - (-500.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn obv_subtracts_volume_on_down_bar() {
        let obv = calculate_obv(&[make_bar(1, 100.0, 1000.0), make_bar(2, 95.0, 300.0)]);
        assert!((obv[1] - (-1300.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn obv_subtracts_volume_on_flat_bar() {
        let obv = calculate_obv(&[make_bar(1, 100.0, 1000.0), make_bar(2, 100.0, 500.0)]);
        assert!((obv[1] - (-1500.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn obv_empty() {
        assert!(calculate_obv(&[]).is_empty());
    }
}
