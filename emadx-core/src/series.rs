//! DataSeries: the aligned, column-oriented per-bar record.
//!
//! Price columns (`dates`, OHLC, `returns`) are fixed at construction.
//! Indicator columns are the only mutable part, and they are replaced whole:
//! a window change recomputes one column over the full series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Bar;
use crate::indicators::{IndicatorError, IndicatorProvider};
use crate::params::{ParameterStore, StrengthPeriods};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("price series is empty")]
    Empty,

    #[error("dates not strictly increasing at bar {index}: {prev} then {date}")]
    Unordered {
        index: usize,
        prev: NaiveDate,
        date: NaiveDate,
    },

    #[error("close must be positive at bar {index} ({date}), got {close}")]
    NonPositiveClose {
        index: usize,
        date: NaiveDate,
        close: f64,
    },

    #[error("column '{column}' has {actual} values, series has {expected} bars")]
    ColumnLength {
        column: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Indicator(#[from] IndicatorError),
}

/// Which indicator column a value series belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorColumn {
    ShortTrend,
    LongTrend,
    TrendStrength,
    DirectionalStrength,
}

impl IndicatorColumn {
    pub fn name(self) -> &'static str {
        match self {
            IndicatorColumn::ShortTrend => "short_trend",
            IndicatorColumn::LongTrend => "long_trend",
            IndicatorColumn::TrendStrength => "trend_strength",
            IndicatorColumn::DirectionalStrength => "directional_strength",
        }
    }
}

/// Log return series: NaN at index 0, `ln(close[t] / close[t-1])` after.
pub fn log_returns(close: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; close.len()];
    for t in 1..close.len() {
        out[t] = (close[t] / close[t - 1]).ln();
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSeries {
    symbol: String,
    dates: Vec<NaiveDate>,
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
    returns: Vec<f64>,
    short_trend: Vec<f64>,
    long_trend: Vec<f64>,
    trend_strength: Vec<f64>,
    directional_strength: Vec<f64>,
}

impl DataSeries {
    /// Validate bars and derive log returns. Indicator columns start all-NaN.
    pub fn from_bars(symbol: impl Into<String>, bars: &[Bar]) -> Result<Self, SeriesError> {
        if bars.is_empty() {
            return Err(SeriesError::Empty);
        }
        for (index, bar) in bars.iter().enumerate() {
            if bar.close.is_nan() || bar.close <= 0.0 {
                return Err(SeriesError::NonPositiveClose {
                    index,
                    date: bar.date,
                    close: bar.close,
                });
            }
            if index > 0 && bars[index - 1].date >= bar.date {
                return Err(SeriesError::Unordered {
                    index,
                    prev: bars[index - 1].date,
                    date: bar.date,
                });
            }
        }

        let n = bars.len();
        let close: Vec<f64> = bars.iter().map(|b| b.close).collect();
        Ok(Self {
            symbol: symbol.into(),
            dates: bars.iter().map(|b| b.date).collect(),
            open: bars.iter().map(|b| b.open).collect(),
            high: bars.iter().map(|b| b.high).collect(),
            low: bars.iter().map(|b| b.low).collect(),
            returns: log_returns(&close),
            close,
            short_trend: vec![f64::NAN; n],
            long_trend: vec![f64::NAN; n],
            trend_strength: vec![f64::NAN; n],
            directional_strength: vec![f64::NAN; n],
        })
    }

    /// Build the series and attach all four indicator columns.
    pub fn build(
        symbol: impl Into<String>,
        bars: &[Bar],
        params: &ParameterStore,
        periods: StrengthPeriods,
        provider: &dyn IndicatorProvider,
    ) -> Result<Self, SeriesError> {
        let mut series = Self::from_bars(symbol, bars)?;
        let short = provider.ema(&series.close, params.short())?;
        let long = provider.ema(&series.close, params.long())?;
        let adx = provider.adx(&series.high, &series.low, &series.close, periods.adx)?;
        let di = provider.plus_di(&series.high, &series.low, &series.close, periods.di_plus)?;

        series = series
            .with_column(IndicatorColumn::ShortTrend, short)?
            .with_column(IndicatorColumn::LongTrend, long)?
            .with_column(IndicatorColumn::TrendStrength, adx)?
            .with_column(IndicatorColumn::DirectionalStrength, di)?;
        Ok(series)
    }

    /// Replace one indicator column, returning the updated series.
    pub fn with_column(
        mut self,
        column: IndicatorColumn,
        values: Vec<f64>,
    ) -> Result<Self, SeriesError> {
        if values.len() != self.len() {
            return Err(SeriesError::ColumnLength {
                column: column.name(),
                expected: self.len(),
                actual: values.len(),
            });
        }
        *self.column_mut(column) = values;
        Ok(self)
    }

    fn column_mut(&mut self, column: IndicatorColumn) -> &mut Vec<f64> {
        match column {
            IndicatorColumn::ShortTrend => &mut self.short_trend,
            IndicatorColumn::LongTrend => &mut self.long_trend,
            IndicatorColumn::TrendStrength => &mut self.trend_strength,
            IndicatorColumn::DirectionalStrength => &mut self.directional_strength,
        }
    }

    pub fn column(&self, column: IndicatorColumn) -> &[f64] {
        match column {
            IndicatorColumn::ShortTrend => &self.short_trend,
            IndicatorColumn::LongTrend => &self.long_trend,
            IndicatorColumn::TrendStrength => &self.trend_strength,
            IndicatorColumn::DirectionalStrength => &self.directional_strength,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn open(&self) -> &[f64] {
        &self.open
    }

    pub fn high(&self) -> &[f64] {
        &self.high
    }

    pub fn low(&self) -> &[f64] {
        &self.low
    }

    pub fn close(&self) -> &[f64] {
        &self.close
    }

    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    pub fn short_trend(&self) -> &[f64] {
        &self.short_trend
    }

    pub fn long_trend(&self) -> &[f64] {
        &self.long_trend
    }

    pub fn trend_strength(&self) -> &[f64] {
        &self.trend_strength
    }

    pub fn directional_strength(&self) -> &[f64] {
        &self.directional_strength
    }

    /// Number of leading bars where at least one indicator is still undefined.
    pub fn warmup_bars(&self) -> usize {
        (0..self.len())
            .take_while(|&t| {
                self.short_trend[t].is_nan()
                    || self.long_trend[t].is_nan()
                    || self.trend_strength[t].is_nan()
                    || self.directional_strength[t].is_nan()
            })
            .count()
    }
}

/// Synthetic bars from close prices: open = previous close, high/low one point
/// outside the body, consecutive calendar days.
#[cfg(test)]
pub(crate) fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}
