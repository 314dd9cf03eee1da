//! Report generation port trait.

use std::io::Write;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SispError;
use crate::domain::indicator::IndicatorFrame;
use crate::domain::pipeline::UploadSummary;

/// Port for writing pipeline output.
pub trait ReportPort {
    fn write_indicators(
        &self,
        frame: &IndicatorFrame,
        out: &mut dyn Write,
    ) -> Result<(), SispError>;

    /// Default implementation: pretty-printed JSON record.
    fn write_backtest(
        &self,
        result: &BacktestResult,
        out: &mut dyn Write,
    ) -> Result<(), SispError> {
        write_json(result, true, out)
    }

    /// Default implementation: pretty-printed JSON record.
    fn write_summary(
        &self,
        summary: &UploadSummary,
        out: &mut dyn Write,
    ) -> Result<(), SispError> {
        write_json(summary, true, out)
    }
}

pub fn write_json<T: serde::Serialize + ?Sized>(
    value: &T,
    pretty: bool,
    out: &mut dyn Write,
) -> Result<(), SispError> {
    let encoded = if pretty {
        serde_json::to_writer_pretty(&mut *out, value)
    } else {
        serde_json::to_writer(&mut *out, value)
    };
    encoded.map_err(|e| SispError::Output {
        reason: format!("JSON encoding failed: {}", e),
    })?;
    writeln!(out)?;
    Ok(())
}
