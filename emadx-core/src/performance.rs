//! Performance evaluator: positions and log returns in, performance curves out.
//!
//! Vectorized over the whole series, recomputed from scratch on every run:
//!
//! - `strategy_return[t] = position[t-1] * return[t]` for t >= 1, NaN at 0
//! - `cum_buyhold[t]  = exp(sum(return[0..=t]))`
//! - `cum_strategy[t] = exp(sum(strategy_return[0..=t]))`
//!
//! # NaN policy
//!
//! Running sums skip undefined entries: a NaN input produces a NaN cumulative
//! value at its own index and adds nothing to later indices. With a NaN first
//! return (always the case) both curves are undefined at bar 0 and start from
//! `exp(return[1])` at bar 1. A single-bar series therefore has no defined
//! strategy return and no defined curve value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Position;
use crate::series::DataSeries;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("cannot evaluate an empty series")]
    EmptySeries,

    #[error("{positions} positions for a series of {bars} bars")]
    LengthMismatch { positions: usize, bars: usize },
}

/// Round to two decimals, half away from zero. NaN stays NaN.
///
/// Exact ties go away from zero, unlike Python's `round`, which sends them to
/// the even neighbour: `round2(0.125)` is 0.13 where Python gives 0.12.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Cumulative sum that skips NaN entries (see module docs).
pub fn nan_skipping_cumsum(values: &[f64]) -> Vec<f64> {
    let mut acc = 0.0;
    values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                f64::NAN
            } else {
                acc += v;
                acc
            }
        })
        .collect()
}

/// Growth of one unit of capital under a log-return series.
pub fn cumulative_curve(log_returns: &[f64]) -> Vec<f64> {
    nan_skipping_cumsum(log_returns)
        .into_iter()
        .map(f64::exp)
        .collect()
}

/// Position held over bar t is the one decided at the close of bar t-1.
pub fn strategy_returns(positions: &[Position], returns: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; returns.len()];
    for t in 1..returns.len().min(positions.len()) {
        out[t] = positions[t - 1].as_f64() * returns[t];
    }
    out
}

/// Largest peak-to-trough decline of a growth curve, as a fraction. Undefined
/// entries are skipped; 0.0 when fewer than two values are defined.
pub fn max_drawdown(curve: &[f64]) -> f64 {
    let mut peak = f64::NAN;
    let mut worst = 0.0_f64;
    for &v in curve.iter().filter(|v| !v.is_nan()) {
        if peak.is_nan() || v > peak {
            peak = v;
        }
        if peak > 0.0 {
            worst = worst.max(1.0 - v / peak);
        }
    }
    worst
}

/// Scalar results of one strategy run.
///
/// `gross_performance` and `outperformance` are the headline figures, rounded
/// to two decimals. Everything else is diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub gross_performance: f64,
    pub outperformance: f64,
    pub final_strategy: f64,
    pub final_buyhold: f64,
    pub position_changes: usize,
    pub long_fraction: f64,
    pub strategy_max_drawdown: f64,
    pub buyhold_max_drawdown: f64,
}

impl PerformanceSummary {
    /// Headline figures from the last bar of both curves. Diagnostics are zeroed.
    pub fn from_curves(cum_strategy: &[f64], cum_buyhold: &[f64]) -> Self {
        let final_strategy = cum_strategy.last().copied().unwrap_or(f64::NAN);
        let final_buyhold = cum_buyhold.last().copied().unwrap_or(f64::NAN);
        Self {
            gross_performance: round2(final_strategy),
            outperformance: round2(final_strategy - final_buyhold),
            final_strategy,
            final_buyhold,
            position_changes: 0,
            long_fraction: 0.0,
            strategy_max_drawdown: 0.0,
            buyhold_max_drawdown: 0.0,
        }
    }
}

/// Per-bar output of one strategy run plus its summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyRun {
    pub positions: Vec<Position>,
    pub strategy_returns: Vec<f64>,
    pub cum_buyhold: Vec<f64>,
    pub cum_strategy: Vec<f64>,
    pub summary: PerformanceSummary,
}

impl StrategyRun {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceEvaluator;

impl PerformanceEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(
        &self,
        series: &DataSeries,
        positions: &[Position],
    ) -> Result<StrategyRun, EvalError> {
        if series.is_empty() {
            return Err(EvalError::EmptySeries);
        }
        if positions.len() != series.len() {
            return Err(EvalError::LengthMismatch {
                positions: positions.len(),
                bars: series.len(),
            });
        }

        let strategy = strategy_returns(positions, series.returns());
        let cum_buyhold = cumulative_curve(series.returns());
        let cum_strategy = cumulative_curve(&strategy);

        let mut summary = PerformanceSummary::from_curves(&cum_strategy, &cum_buyhold);
        summary.position_changes = positions.windows(2).filter(|w| w[0] != w[1]).count();
        summary.long_fraction = long_fraction(positions, &strategy);
        summary.strategy_max_drawdown = max_drawdown(&cum_strategy);
        summary.buyhold_max_drawdown = max_drawdown(&cum_buyhold);

        Ok(StrategyRun {
            positions: positions.to_vec(),
            strategy_returns: strategy,
            cum_buyhold,
            cum_strategy,
            summary,
        })
    }
}

/// Share of bars with a defined strategy return that were held long.
fn long_fraction(positions: &[Position], strategy: &[f64]) -> f64 {
    let (held, long) = (1..strategy.len())
        .filter(|&t| !strategy[t].is_nan())
        .fold((0usize, 0usize), |(held, long), t| {
            (held + 1, long + usize::from(positions[t - 1].is_long()))
        });
    if held == 0 {
        0.0
    } else {
        long as f64 / held as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::make_bars;

    use Position::{Long, Short};

    fn series(closes: &[f64]) -> DataSeries {
        DataSeries::from_bars("X", &make_bars(closes)).unwrap()
    }

    #[test]
    fn round2_half_away_from_zero() {
        assert_eq!(round2(1.005_000_1), 1.01);
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(-0.125_000_1), -0.13);
        assert!(round2(f64::NAN).is_nan());
    }

    #[test]
    fn round2_exact_tie_goes_away_from_zero() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(2.5), 2.5);
    }

    #[test]
    fn cumsum_skips_nan() {
        let out = nan_skipping_cumsum(&[f64::NAN, 1.0, f64::NAN, 2.0]);
        assert!(out[0].is_nan());
        assert_eq!(out[1], 1.0);
        assert!(out[2].is_nan());
        assert_eq!(out[3], 3.0);
    }

    #[test]
    fn strategy_returns_lag_positions() {
        let r = [f64::NAN, 0.1, -0.2, 0.3];
        let s = strategy_returns(&[Long, Short, Long, Short], &r);
        assert!(s[0].is_nan());
        assert_eq!(s[1], 0.1);
        assert_eq!(s[2], 0.2);
        assert_eq!(s[3], 0.3);
    }

    #[test]
    fn always_long_tracks_buy_and_hold() {
        let s = series(&[100.0, 110.0, 99.0, 120.0]);
        let run = PerformanceEvaluator::new()
            .evaluate(&s, &[Long; 4])
            .unwrap();
        for t in 1..4 {
            assert!((run.cum_strategy[t] - run.cum_buyhold[t]).abs() < 1e-12);
        }
        assert!((run.summary.final_buyhold - 1.2).abs() < 1e-12);
        assert_eq!(run.summary.gross_performance, 1.2);
        assert_eq!(run.summary.outperformance, 0.0);
        assert_eq!(run.summary.long_fraction, 1.0);
    }

    #[test]
    fn single_bar_series_is_all_undefined() {
        let run = PerformanceEvaluator::new()
            .evaluate(&series(&[100.0]), &[Short])
            .unwrap();
        assert!(run.strategy_returns[0].is_nan());
        assert!(run.cum_buyhold[0].is_nan());
        assert!(run.cum_strategy[0].is_nan());
        assert!(run.summary.gross_performance.is_nan());
        assert_eq!(run.summary.long_fraction, 0.0);
    }

    #[test]
    fn length_mismatch_rejected() {
        let err = PerformanceEvaluator::new()
            .evaluate(&series(&[100.0, 101.0]), &[Long])
            .unwrap_err();
        assert_eq!(err, EvalError::LengthMismatch { positions: 1, bars: 2 });
    }

    #[test]
    fn drawdown_of_curve() {
        assert_eq!(max_drawdown(&[f64::NAN, 1.0, 2.0, 1.0, 1.5]), 0.5);
        assert_eq!(max_drawdown(&[1.0, 1.1, 1.2]), 0.0);
        assert_eq!(max_drawdown(&[f64::NAN]), 0.0);
    }

    #[test]
    fn counts_position_changes() {
        let s = series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let run = PerformanceEvaluator::new()
            .evaluate(&s, &[Short, Long, Long, Short, Long])
            .unwrap();
        assert_eq!(run.summary.position_changes, 3);
        // Held over bars 1..=4: Short, Long, Long, Short.
        assert_eq!(run.summary.long_fraction, 0.5);
    }
}
