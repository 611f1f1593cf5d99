//! Per-bar performance export (CSV/Parquet).

use std::fs::File;
use std::path::Path;

use polars::prelude::{Column, DataFrame, NamedFrom, ParquetWriter, Series};

use emadx_core::{DataSeries, StrategyRun};

use super::{io_error, ExportError};

/// Column order shared by both formats.
pub const PERFORMANCE_COLUMNS: [&str; 11] = [
    "date",
    "close",
    "return",
    "short_trend",
    "long_trend",
    "trend_strength",
    "directional_strength",
    "position",
    "strategy",
    "cum_buyhold",
    "cum_strategy",
];

/// Undefined values are written as empty fields.
fn cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

pub fn write_performance_csv(
    path: &Path,
    series: &DataSeries,
    run: &StrategyRun,
) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(PERFORMANCE_COLUMNS)?;
    for t in 0..series.len() {
        writer.write_record([
            series.dates()[t].to_string(),
            cell(series.close()[t]),
            cell(series.returns()[t]),
            cell(series.short_trend()[t]),
            cell(series.long_trend()[t]),
            cell(series.trend_strength()[t]),
            cell(series.directional_strength()[t]),
            run.positions[t].sign().to_string(),
            cell(run.strategy_returns[t]),
            cell(run.cum_buyhold[t]),
            cell(run.cum_strategy[t]),
        ])?;
    }
    writer.flush().map_err(io_error(path))?;
    Ok(())
}

pub fn write_performance_parquet(
    path: &Path,
    series: &DataSeries,
    run: &StrategyRun,
) -> Result<(), ExportError> {
    let dates: Vec<String> = series.dates().iter().map(|d| d.to_string()).collect();
    let positions: Vec<i32> = run.positions.iter().map(|p| i32::from(p.sign())).collect();

    let f64_column =
        |name: &str, values: &[f64]| -> Column { Series::new(name.into(), values.to_vec()).into() };

    let columns: Vec<Column> = vec![
        Series::new("date".into(), dates).into(),
        f64_column("close", series.close()),
        f64_column("return", series.returns()),
        f64_column("short_trend", series.short_trend()),
        f64_column("long_trend", series.long_trend()),
        f64_column("trend_strength", series.trend_strength()),
        f64_column("directional_strength", series.directional_strength()),
        Series::new("position".into(), positions).into(),
        f64_column("strategy", &run.strategy_returns),
        f64_column("cum_buyhold", &run.cum_buyhold),
        f64_column("cum_strategy", &run.cum_strategy),
    ];
    let mut df = DataFrame::new(columns)?;

    let mut file = File::create(path).map_err(io_error(path))?;
    ParquetWriter::new(&mut file).finish(&mut df)?;
    Ok(())
}
