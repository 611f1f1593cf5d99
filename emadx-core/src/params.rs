//! Trend-window parameters and value-oriented indicator recomputation.
//!
//! `ParameterStore::set` consumes a series and hands back the updated one, so
//! there is never a shared series being mutated behind a caller's back. Only
//! the column whose window changed is recomputed; everything else moves
//! through untouched.
//!
//! The short window is meant to be smaller than the long one, but a crossed
//! pair is legal input and simply produces whatever signal the rule yields.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::IndicatorProvider;
use crate::series::{DataSeries, IndicatorColumn, SeriesError};

/// ADX period used by the original EMA/ADX system.
pub const DEFAULT_ADX_PERIOD: usize = 7;
/// +DI period used by the original EMA/ADX system.
pub const DEFAULT_DI_PERIOD: usize = 14;

/// Fixed periods of the trend-strength and directional-strength indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrengthPeriods {
    pub adx: usize,
    pub di_plus: usize,
}

impl Default for StrengthPeriods {
    fn default() -> Self {
        Self {
            adx: DEFAULT_ADX_PERIOD,
            di_plus: DEFAULT_DI_PERIOD,
        }
    }
}

/// Partial window update. `None` leaves that window (and its column) alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterUpdate {
    pub short: Option<usize>,
    pub long: Option<usize>,
}

impl ParameterUpdate {
    pub fn short(window: usize) -> Self {
        Self {
            short: Some(window),
            long: None,
        }
    }

    pub fn long(window: usize) -> Self {
        Self {
            short: None,
            long: Some(window),
        }
    }

    pub fn both(short: usize, long: usize) -> Self {
        Self {
            short: Some(short),
            long: Some(long),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.short.is_none() && self.long.is_none()
    }
}

/// The two EMA window lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterStore {
    short: usize,
    long: usize,
}

impl ParameterStore {
    pub fn new(short: usize, long: usize) -> Self {
        Self { short, long }
    }

    pub fn short(&self) -> usize {
        self.short
    }

    pub fn long(&self) -> usize {
        self.long
    }

    /// True when the short window is not below the long one.
    pub fn is_crossed(&self) -> bool {
        self.short >= self.long
    }

    /// Apply `update`, recomputing only the affected trend columns of `series`.
    ///
    /// On error the stored windows are left as they were.
    pub fn set(
        &mut self,
        series: DataSeries,
        update: ParameterUpdate,
        provider: &dyn IndicatorProvider,
    ) -> Result<DataSeries, SeriesError> {
        let mut series = series;
        let mut next = *self;

        if let Some(short) = update.short {
            debug!(window = short, "recomputing short trend");
            let values = provider.ema(series.close(), short)?;
            series = series.with_column(IndicatorColumn::ShortTrend, values)?;
            next.short = short;
        }
        if let Some(long) = update.long {
            debug!(window = long, "recomputing long trend");
            let values = provider.ema(series.close(), long)?;
            series = series.with_column(IndicatorColumn::LongTrend, values)?;
            next.long = long;
        }

        if next.is_crossed() {
            debug!(short = next.short, long = next.long, "short window is not below long window");
        }
        *self = next;
        Ok(series)
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new(5, 20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{IndicatorError, WilderIndicators};
    use crate::series::make_bars;

    fn built(store: &ParameterStore) -> DataSeries {
        let closes: Vec<f64> = (0..80)
            .map(|i| 100.0 + (i as f64 * 0.2).sin() * 5.0 + i as f64 * 0.1)
            .collect();
        DataSeries::build(
            "X",
            &make_bars(&closes),
            store,
            StrengthPeriods::default(),
            &WilderIndicators,
        )
        .unwrap()
    }

    fn same_bits(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
    }

    #[test]
    fn short_update_touches_only_short_column() {
        let mut store = ParameterStore::new(10, 30);
        let before = built(&store);
        let after = store
            .set(before.clone(), ParameterUpdate::short(5), &WilderIndicators)
            .unwrap();

        assert_eq!(store.short(), 5);
        assert_eq!(store.long(), 30);
        assert!(!same_bits(before.short_trend(), after.short_trend()));
        assert!(same_bits(before.long_trend(), after.long_trend()));
        assert!(same_bits(before.trend_strength(), after.trend_strength()));
        assert!(same_bits(before.directional_strength(), after.directional_strength()));
        assert!(same_bits(before.close(), after.close()));
        assert!(same_bits(before.returns(), after.returns()));
        assert_eq!(before.dates(), after.dates());
    }

    #[test]
    fn long_update_matches_fresh_build() {
        let mut store = ParameterStore::new(5, 20);
        let series = built(&store);
        let updated = store
            .set(series, ParameterUpdate::long(40), &WilderIndicators)
            .unwrap();
        let fresh = built(&ParameterStore::new(5, 40));
        assert!(same_bits(updated.long_trend(), fresh.long_trend()));
        assert!(same_bits(updated.short_trend(), fresh.short_trend()));
    }

    #[test]
    fn empty_update_is_identity() {
        let mut store = ParameterStore::new(5, 20);
        let series = built(&store);
        let same = store
            .set(series.clone(), ParameterUpdate::default(), &WilderIndicators)
            .unwrap();
        assert!(same_bits(series.short_trend(), same.short_trend()));
        assert_eq!(store, ParameterStore::new(5, 20));
    }

    #[test]
    fn crossed_windows_are_accepted() {
        let mut store = ParameterStore::new(5, 20);
        let series = built(&store);
        store
            .set(series, ParameterUpdate::both(30, 10), &WilderIndicators)
            .unwrap();
        assert!(store.is_crossed());
        assert_eq!((store.short(), store.long()), (30, 10));
    }

    #[test]
    fn invalid_window_leaves_store_unchanged() {
        let mut store = ParameterStore::new(5, 20);
        let series = built(&store);
        let err = store
            .set(series, ParameterUpdate::both(8, 0), &WilderIndicators)
            .unwrap_err();
        assert!(matches!(
            err,
            SeriesError::Indicator(IndicatorError::InvalidPeriod { period: 0, .. })
        ));
        assert_eq!(store, ParameterStore::new(5, 20));
    }
}
