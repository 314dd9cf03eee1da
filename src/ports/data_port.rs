//! Data access port trait.

use crate::domain::error::SispError;
use crate::domain::ohlcv::BarSeries;
use std::path::Path;

/// Source of normalized bar series: ascending, de-duplicated, long enough.
pub trait DataPort {
    fn load_series(&self, source: &Path) -> Result<BarSeries, SispError>;
}
