//! Run manifest export (JSON).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use emadx_core::data::DataSource;
use emadx_core::fingerprint::{RunFingerprint, StrategyParams};
use emadx_core::{DataSeries, PerformanceSummary, StrategyRun};

use super::{io_error, ExportError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub dataset_hash: String,
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub source: DataSource,
    pub synthetic: bool,
    pub bars: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub params: StrategyParams,
    pub summary: PerformanceSummary,
}

pub fn write_manifest(
    path: &Path,
    fingerprint: &RunFingerprint,
    series: &DataSeries,
    run: &StrategyRun,
    source: DataSource,
) -> Result<(), ExportError> {
    // DataSeries is never empty.
    let (first_date, last_date) = match (series.dates().first(), series.dates().last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => (NaiveDate::MIN, NaiveDate::MIN),
    };
    let manifest = RunManifest {
        run_id: fingerprint.run_id.clone(),
        dataset_hash: fingerprint.dataset_hash.clone(),
        timestamp: Utc::now(),
        symbol: series.symbol().to_string(),
        source,
        synthetic: source.is_synthetic(),
        bars: series.len(),
        first_date,
        last_date,
        params: fingerprint.params,
        summary: run.summary.clone(),
    };

    let json = serde_json::to_string_pretty(&manifest)?;
    std::fs::write(path, json).map_err(io_error(path))?;
    Ok(())
}
