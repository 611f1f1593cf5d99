//! Signal engine: EMA crossover gated by ADX and +DI.
//!
//! Rule, evaluated per bar with no lookback beyond that bar's own values:
//!
//! ```text
//! Long  if short_trend > long_trend
//!        && trend_strength >= threshold
//!        && directional_strength >= threshold
//! Short otherwise
//! ```
//!
//! There is no flat state. Both strength gates share one threshold.

use serde::{Deserialize, Serialize};

use crate::domain::Position;
use crate::series::DataSeries;

/// Gate threshold applied to both ADX and +DI unless configured otherwise.
pub const DEFAULT_THRESHOLD: f64 = 25.0;

/// How a rule conjunct treats an undefined (NaN) indicator operand.
///
/// Every conjunct with a NaN operand is false, so a bar still in warm-up can
/// never be long. This is spelled out here instead of leaning on IEEE-754
/// comparison semantics.
pub mod undefined_policy {
    /// `a > b`, false if either side is undefined.
    pub fn above(a: f64, b: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        a > b
    }

    /// `value >= threshold`, false if either side is undefined.
    pub fn at_least(value: f64, threshold: f64) -> bool {
        if value.is_nan() || threshold.is_nan() {
            return false;
        }
        value >= threshold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalEngine {
    threshold: f64,
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl SignalEngine {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Classify a single bar from its four indicator values.
    pub fn position_at(
        &self,
        short_trend: f64,
        long_trend: f64,
        trend_strength: f64,
        directional_strength: f64,
    ) -> Position {
        let crossover = undefined_policy::above(short_trend, long_trend);
        let trending = undefined_policy::at_least(trend_strength, self.threshold);
        let directional = undefined_policy::at_least(directional_strength, self.threshold);

        if crossover && trending && directional {
            Position::Long
        } else {
            Position::Short
        }
    }

    /// Positions for every bar of the series.
    pub fn positions(&self, series: &DataSeries) -> Vec<Position> {
        series
            .short_trend()
            .iter()
            .zip(series.long_trend())
            .zip(series.trend_strength())
            .zip(series.directional_strength())
            .map(|(((&s, &l), &adx), &di)| self.position_at(s, l, adx, di))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{make_bars, IndicatorColumn};

    const NAN: f64 = f64::NAN;

    #[test]
    fn all_conditions_met_is_long() {
        let engine = SignalEngine::default();
        assert_eq!(engine.position_at(1.2, 1.1, 30.0, 40.0), Position::Long);
    }

    #[test]
    fn any_condition_failing_is_short() {
        let engine = SignalEngine::default();
        assert_eq!(engine.position_at(1.0, 1.1, 30.0, 40.0), Position::Short);
        assert_eq!(engine.position_at(1.1, 1.1, 30.0, 40.0), Position::Short);
        assert_eq!(engine.position_at(1.2, 1.1, 24.9, 40.0), Position::Short);
        assert_eq!(engine.position_at(1.2, 1.1, 30.0, 24.9), Position::Short);
    }

    #[test]
    fn threshold_is_inclusive() {
        let engine = SignalEngine::default();
        assert_eq!(engine.position_at(2.0, 1.0, 25.0, 25.0), Position::Long);
    }

    #[test]
    fn undefined_operand_is_short() {
        let engine = SignalEngine::default();
        assert_eq!(engine.position_at(NAN, 1.0, 30.0, 30.0), Position::Short);
        assert_eq!(engine.position_at(2.0, NAN, 30.0, 30.0), Position::Short);
        assert_eq!(engine.position_at(2.0, 1.0, NAN, 30.0), Position::Short);
        assert_eq!(engine.position_at(2.0, 1.0, 30.0, NAN), Position::Short);
        assert_eq!(engine.position_at(NAN, NAN, NAN, NAN), Position::Short);
    }

    #[test]
    fn policy_functions() {
        assert!(undefined_policy::above(2.0, 1.0));
        assert!(!undefined_policy::above(1.0, 1.0));
        assert!(!undefined_policy::above(NAN, 1.0));
        assert!(undefined_policy::at_least(25.0, 25.0));
        assert!(!undefined_policy::at_least(NAN, 25.0));
        assert!(!undefined_policy::at_least(30.0, NAN));
    }

    #[test]
    fn custom_threshold() {
        let engine = SignalEngine::new(40.0);
        assert_eq!(engine.threshold(), 40.0);
        assert_eq!(engine.position_at(2.0, 1.0, 30.0, 50.0), Position::Short);
        assert_eq!(engine.position_at(2.0, 1.0, 40.0, 50.0), Position::Long);
    }

    #[test]
    fn positions_over_series() {
        let series = DataSeries::from_bars("X", &make_bars(&[100.0, 102.0, 101.0, 105.0]))
            .unwrap()
            .with_column(IndicatorColumn::ShortTrend, vec![NAN, NAN, 101.0, 103.0])
            .unwrap()
            .with_column(IndicatorColumn::LongTrend, vec![NAN, NAN, 101.5, 102.0])
            .unwrap()
            .with_column(IndicatorColumn::TrendStrength, vec![NAN, NAN, 30.0, 25.0])
            .unwrap()
            .with_column(IndicatorColumn::DirectionalStrength, vec![NAN, NAN, 30.0, 26.0])
            .unwrap();

        let positions = SignalEngine::default().positions(&series);
        assert_eq!(
            positions,
            vec![Position::Short, Position::Short, Position::Short, Position::Long]
        );
    }
}
