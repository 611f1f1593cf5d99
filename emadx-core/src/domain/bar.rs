//! Bar: one validated OHLC row of a price series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::provider::RawBar;

/// Daily (or weekly/monthly) OHLC bar for the instrument under test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Returns true if any OHLC field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high is the top of the range, low the bottom, prices positive.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

impl From<RawBar> for Bar {
    fn from(raw: RawBar) -> Self {
        Self {
            date: raw.date,
            open: raw.open,
            high: raw.high,
            low: raw.low,
            close: raw.close,
            volume: raw.volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2021, 12, 30).unwrap(),
            open: 1.1320,
            high: 1.1360,
            low: 1.1290,
            close: 1.1325,
            volume: 0,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_void() {
        let mut bar = sample_bar();
        bar.close = f64::NAN;
        assert!(bar.is_void());
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_inverted_range() {
        let mut bar = sample_bar();
        bar.high = 1.1200;
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_from_raw_keeps_prices() {
        let raw = RawBar {
            date: NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 10,
            adj_close: 1.5,
        };
        let bar = Bar::from(raw);
        assert_eq!(bar.close, 1.5);
        assert_eq!(bar.volume, 10);
    }
}
