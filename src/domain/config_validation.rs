//! Configuration validation.
//!
//! Validates config fields before any file is read.

use crate::domain::error::SispError;
use crate::domain::ohlcv::MIN_BARS;
use crate::ports::config_port::ConfigPort;

pub const OUTPUT_FORMATS: [&str; 2] = ["json", "csv"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), SispError> {
    validate_ingest_config(config)?;
    validate_backtest_config(config)?;
    validate_output_config(config)?;
    Ok(())
}

pub fn validate_ingest_config(config: &dyn ConfigPort) -> Result<(), SispError> {
    validate_max_upload_bytes(config)?;
    validate_min_bars(config)?;
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SispError> {
    validate_initial_capital(config)?;
    validate_trades_sample_size(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> SispError {
    SispError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Integer value of `key`, or `default` when absent. A present value that
/// does not parse is rejected rather than replaced by the default.
pub fn int_value(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, SispError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(section, key, &format!("{key} must be an integer, got '{raw}'"))),
    }
}

/// Floating-point value of `key`, or `default` when absent.
pub fn double_value(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, SispError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid(section, key, &format!("{key} must be a number, got '{raw}'"))),
    }
}

fn validate_max_upload_bytes(config: &dyn ConfigPort) -> Result<(), SispError> {
    let value = int_value(config, "ingest", "max_upload_bytes", 1)?;
    if value <= 0 {
        return Err(invalid(
            "ingest",
            "max_upload_bytes",
            "max_upload_bytes must be positive",
        ));
    }
    Ok(())
}

fn validate_min_bars(config: &dyn ConfigPort) -> Result<(), SispError> {
    let value = int_value(config, "ingest", "min_bars", MIN_BARS as i64)?;
    if value < MIN_BARS as i64 {
        return Err(invalid(
            "ingest",
            "min_bars",
            &format!("min_bars must be at least {MIN_BARS}"),
        ));
    }
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), SispError> {
    let value = double_value(config, "backtest", "initial_capital", 1.0)?;
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_trades_sample_size(config: &dyn ConfigPort) -> Result<(), SispError> {
    let value = int_value(config, "backtest", "trades_sample_size", 0)?;
    if value < 0 {
        return Err(invalid(
            "backtest",
            "trades_sample_size",
            "trades_sample_size must be non-negative",
        ));
    }
    Ok(())
}

pub fn validate_output_config(config: &dyn ConfigPort) -> Result<(), SispError> {
    match config.get_string("output", "format") {
        None => Ok(()),
        Some(format) if OUTPUT_FORMATS.contains(&format.trim().to_lowercase().as_str()) => Ok(()),
        Some(_) => Err(invalid(
            "output",
            "format",
            "format must be one of: json, csv",
        )),
    }
}
