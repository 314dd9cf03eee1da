//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod signal;
pub mod portfolio;
pub mod backtest;
pub mod metrics;
pub mod timeframe;
pub mod pipeline;
pub mod config_validation;
pub mod error;
