//! Data provider trait, history request types, and structured error types.
//!
//! The DataProvider trait abstracts over data sources (Yahoo Finance, CSV import,
//! synthetic random walk) so the backtester can swap implementations and tests
//! can run offline.

use chrono::{Days, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raw OHLCV bar from a data provider (before validation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adj_close: f64,
}

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} while fetching {symbol}")]
    HttpStatus { symbol: String, status: u16 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no bars returned for {symbol} in the requested window")]
    EmptyHistory { symbol: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Unit of a lookback duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookbackUnit {
    Days,
    Weeks,
    Months,
    Years,
}

/// How far back from the end timestamp to request history, e.g. `"3 Y"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Lookback {
    pub amount: u32,
    pub unit: LookbackUnit,
}

impl Lookback {
    pub fn years(amount: u32) -> Self {
        Self {
            amount,
            unit: LookbackUnit::Years,
        }
    }

    /// First calendar date covered by the window ending at `end`.
    pub fn start_from(&self, end: NaiveDate) -> Result<NaiveDate, DataError> {
        let start = match self.unit {
            LookbackUnit::Days => end.checked_sub_days(Days::new(u64::from(self.amount))),
            LookbackUnit::Weeks => end.checked_sub_days(Days::new(7 * u64::from(self.amount))),
            LookbackUnit::Months => end.checked_sub_months(Months::new(self.amount)),
            LookbackUnit::Years => end.checked_sub_months(Months::new(12 * self.amount)),
        };
        start.ok_or_else(|| DataError::InvalidRequest(format!("lookback {self} underflows {end}")))
    }
}

impl Default for Lookback {
    fn default() -> Self {
        Self::years(3)
    }
}

impl FromStr for Lookback {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (amount, unit) = match (parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(u), None) => (a, u),
            _ => {
                return Err(DataError::InvalidRequest(format!(
                    "lookback '{s}' must look like '3 Y'"
                )))
            }
        };
        let amount: u32 = amount
            .parse()
            .map_err(|_| DataError::InvalidRequest(format!("lookback amount '{amount}'")))?;
        if amount == 0 {
            return Err(DataError::InvalidRequest("lookback must be positive".into()));
        }
        let unit = match unit.to_ascii_uppercase().as_str() {
            "D" => LookbackUnit::Days,
            "W" => LookbackUnit::Weeks,
            "M" => LookbackUnit::Months,
            "Y" => LookbackUnit::Years,
            other => {
                return Err(DataError::InvalidRequest(format!(
                    "lookback unit '{other}' (expected D, W, M or Y)"
                )))
            }
        };
        Ok(Self { amount, unit })
    }
}

impl TryFrom<String> for Lookback {
    type Error = DataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Lookback> for String {
    fn from(value: Lookback) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            LookbackUnit::Days => "D",
            LookbackUnit::Weeks => "W",
            LookbackUnit::Months => "M",
            LookbackUnit::Years => "Y",
        };
        write!(f, "{} {unit}", self.amount)
    }
}

/// Bar granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BarSize {
    #[default]
    Day,
    Week,
    Month,
}

impl BarSize {
    /// Interval code understood by the Yahoo chart API.
    pub fn yahoo_interval(self) -> &'static str {
        match self {
            BarSize::Day => "1d",
            BarSize::Week => "1wk",
            BarSize::Month => "1mo",
        }
    }
}

impl FromStr for BarSize {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1 day" | "1d" | "day" => Ok(BarSize::Day),
            "1 week" | "1w" | "1wk" | "week" => Ok(BarSize::Week),
            "1 month" | "1mo" | "month" => Ok(BarSize::Month),
            other => Err(DataError::InvalidRequest(format!(
                "bar size '{other}' (expected '1 day', '1 week' or '1 month')"
            ))),
        }
    }
}

impl TryFrom<String> for BarSize {
    type Error = DataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BarSize> for String {
    fn from(value: BarSize) -> Self {
        value.to_string()
    }
}

impl fmt::Display for BarSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BarSize::Day => "1 day",
            BarSize::Week => "1 week",
            BarSize::Month => "1 month",
        };
        f.write_str(s)
    }
}

/// Parse an end timestamp. Accepts `"20211231 10:00:00"`, `"2021-12-31 10:00:00"`,
/// `"2021-12-31T10:00:00"` and bare dates (interpreted as end of day).
pub fn parse_end_timestamp(s: &str) -> Result<NaiveDateTime, DataError> {
    let s = s.trim();
    for fmt in ["%Y%m%d %H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ts);
        }
    }
    for fmt in ["%Y%m%d", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(t) = NaiveTime::from_hms_opt(23, 59, 59) {
                return Ok(date.and_time(t));
            }
        }
    }
    Err(DataError::InvalidRequest(format!("end timestamp '{s}'")))
}

/// Everything a provider needs to fetch one instrument's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRequest {
    pub symbol: String,
    pub end: NaiveDateTime,
    pub lookback: Lookback,
    pub bar_size: BarSize,
}

impl HistoryRequest {
    /// Inclusive calendar window `[start, end]` covered by this request.
    pub fn date_range(&self) -> Result<(NaiveDate, NaiveDate), DataError> {
        let end = self.end.date();
        Ok((self.lookback.start_from(end)?, end))
    }
}

/// Result of a successful data fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<RawBar>,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Synthetic,
}

impl DataSource {
    pub fn is_synthetic(self) -> bool {
        matches!(self, DataSource::Synthetic)
    }
}

/// Trait for data providers.
///
/// A fetch is a single blocking round trip. Providers perform no retries;
/// failures propagate to the caller unchanged.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch bars for the requested window, ordered by date ascending.
    fn fetch(&self, request: &HistoryRequest) -> Result<FetchResult, DataError>;
}
