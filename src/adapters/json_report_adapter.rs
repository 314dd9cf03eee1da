//! JSON report adapter implementing ReportPort.
//!
//! Indicator frames are written as an array of records, one object per bar
//! keyed by `datetime` plus the output columns; missing values become `null`.

use std::io::Write;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SispError;
use crate::domain::indicator::IndicatorFrame;
use crate::domain::pipeline::UploadSummary;
use crate::ports::report_port::{ReportPort, write_json};

pub struct JsonReportAdapter {
    pretty: bool,
}

impl JsonReportAdapter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl Default for JsonReportAdapter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ReportPort for JsonReportAdapter {
    fn write_indicators(
        &self,
        frame: &IndicatorFrame,
        out: &mut dyn Write,
    ) -> Result<(), SispError> {
        write_json(&frame.rows, self.pretty, out)
    }

    fn write_backtest(
        &self,
        result: &BacktestResult,
        out: &mut dyn Write,
    ) -> Result<(), SispError> {
        write_json(result, self.pretty, out)
    }

    fn write_summary(
        &self,
        summary: &UploadSummary,
        out: &mut dyn Write,
    ) -> Result<(), SispError> {
        write_json(summary, self.pretty, out)
    }
}
