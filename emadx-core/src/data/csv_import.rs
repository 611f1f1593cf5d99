//! CSV file provider.
//!
//! Reads `date,open,high,low,close[,volume[,adj_close]]` rows with a header.
//! Dates are ISO (`2021-12-31`). Rows outside the requested window are dropped
//! and the result is sorted by date; duplicate dates are rejected.

use super::provider::{DataError, DataProvider, DataSource, FetchResult, HistoryRequest, RawBar};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date", alias = "timestamp")]
    date: NaiveDate,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(default, alias = "Volume")]
    volume: Option<u64>,
    #[serde(default, alias = "Adj Close")]
    adj_close: Option<f64>,
}

/// Provider backed by a single local CSV file.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    path: PathBuf,
}

impl CsvProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every row of the file, sorted by date.
    pub fn read_all(&self) -> Result<Vec<RawBar>, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)?;

        let mut bars = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = row?;
            bars.push(RawBar {
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume.unwrap_or(0),
                adj_close: row.adj_close.unwrap_or(row.close),
            });
        }

        bars.sort_by_key(|b| b.date);
        if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(DataError::InvalidRequest(format!(
                "duplicate date {} in {}",
                pair[0].date,
                self.path.display()
            )));
        }
        Ok(bars)
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(&self, request: &HistoryRequest) -> Result<FetchResult, DataError> {
        let (start, end) = request.date_range()?;
        let bars: Vec<RawBar> = self
            .read_all()?
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect();

        if bars.is_empty() {
            return Err(DataError::EmptyHistory {
                symbol: request.symbol.clone(),
            });
        }

        info!(path = %self.path.display(), bars = bars.len(), "loaded csv history");
        Ok(FetchResult {
            symbol: request.symbol.clone(),
            bars,
            source: DataSource::CsvImport,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::{parse_end_timestamp, BarSize, Lookback};
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn request(end: &str, lookback: &str) -> HistoryRequest {
        HistoryRequest {
            symbol: "TEST".into(),
            end: parse_end_timestamp(end).unwrap(),
            lookback: lookback.parse::<Lookback>().unwrap(),
            bar_size: BarSize::Day,
        }
    }

    #[test]
    fn reads_sorted_and_filters_window() {
        let file = write_csv(
            "date,open,high,low,close,volume\n\
             2024-01-04,101,103,100,102,10\n\
             2024-01-02,99,101,98,100,10\n\
             2024-01-03,100,102,99,101,10\n\
             2023-06-01,90,91,89,90,10\n",
        );
        let provider = CsvProvider::new(file.path());
        let result = provider.fetch(&request("2024-01-31", "1 M")).unwrap();
        let dates: Vec<String> = result.bars.iter().map(|b| b.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-02", "2024-01-03", "2024-01-04"]);
        assert_eq!(result.source, DataSource::CsvImport);
    }

    #[test]
    fn volume_and_adj_close_are_optional() {
        let file = write_csv("date,open,high,low,close\n2024-01-02,1.1,1.2,1.0,1.15\n");
        let bars = CsvProvider::new(file.path()).read_all().unwrap();
        assert_eq!(bars[0].volume, 0);
        assert_eq!(bars[0].adj_close, 1.15);
    }

    #[test]
    fn duplicate_dates_rejected() {
        let file = write_csv(
            "date,open,high,low,close\n2024-01-02,1,1,1,1\n2024-01-02,1,1,1,1\n",
        );
        assert!(matches!(
            CsvProvider::new(file.path()).read_all(),
            Err(DataError::InvalidRequest(_))
        ));
    }

    #[test]
    fn empty_window_is_an_error() {
        let file = write_csv("date,open,high,low,close\n2020-01-02,1,1,1,1\n");
        let err = CsvProvider::new(file.path())
            .fetch(&request("2024-01-31", "1 M"))
            .unwrap_err();
        assert!(matches!(err, DataError::EmptyHistory { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = CsvProvider::new("/definitely/not/here.csv").read_all().unwrap_err();
        assert!(matches!(err, DataError::Csv(_)));
    }
}
