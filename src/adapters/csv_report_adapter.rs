//! CSV report adapter implementing ReportPort.
//!
//! Only the indicator frame is tabular; backtest results and upload
//! summaries use the port's JSON defaults.

use std::io::Write;

use crate::domain::error::SispError;
use crate::domain::indicator::{IndicatorFrame, finite_or_none};
use crate::ports::report_port::ReportPort;

#[derive(Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn output_error(e: csv::Error) -> SispError {
    SispError::Output {
        reason: format!("CSV write failed: {}", e),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_indicators(
        &self,
        frame: &IndicatorFrame,
        out: &mut dyn Write,
    ) -> Result<(), SispError> {
        let mut wtr = csv::Writer::from_writer(out);

        let mut header = vec!["datetime".to_string()];
        header.extend(IndicatorFrame::columns());
        wtr.write_record(&header).map_err(output_error)?;

        for row in &frame.rows {
            let mut record = vec![row.bar.timestamp_string()];
            record.extend(
                row.values()
                    .into_iter()
                    .map(|v| finite_or_none(v).map(|v| v.to_string()).unwrap_or_default()),
            );
            wtr.write_record(&record).map_err(output_error)?;
        }

        wtr.flush()?;
        Ok(())
    }
}
