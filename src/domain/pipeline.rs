//! End-to-end stages: bar series → indicator frame → backtest result.

use log::{debug, info, warn};
use serde::Serialize;

use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::indicator::{INDICATOR_COLUMNS, IndicatorFrame, compute_all_indicators};
use crate::domain::ohlcv::BarSeries;
use crate::domain::timeframe::infer_timeframe;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadSummary {
    pub rows: usize,
    pub columns: Vec<String>,
    pub inferred_timeframe: Option<String>,
}

pub fn run_indicators(series: &BarSeries) -> IndicatorFrame {
    info!("computing indicators over {} bars", series.len());
    let frame = compute_all_indicators(series);

    for indicator in INDICATOR_COLUMNS {
        let missing = frame.missing_count(indicator);
        if missing > 0 {
            warn!("{} has {} missing values", indicator, missing);
        }
    }
    frame
}

pub fn run_backtest_pipeline(series: &BarSeries, config: &BacktestConfig) -> BacktestResult {
    let frame = run_indicators(series);
    debug!(
        "running backtest: initial capital {}, sample size {}",
        config.initial_capital, config.trades_sample_size
    );
    let result = backtest_engine::run_backtest(&frame, config);
    info!(
        "backtest finished: {} trades, final value {:.2}",
        result.n_trades, result.final_portfolio_value
    );
    result
}

/// Row count, output columns, and bar interval of an ingested series.
pub fn summarize(series: &BarSeries) -> UploadSummary {
    let frame = run_indicators(series);
    let mut columns = vec!["datetime".to_string()];
    columns.extend(IndicatorFrame::columns());

    UploadSummary {
        rows: frame.len(),
        columns,
        inferred_timeframe: Some(infer_timeframe(series).to_string()),
    }
}
