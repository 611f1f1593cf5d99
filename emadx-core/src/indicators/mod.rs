//! Indicator boundary and the built-in Wilder implementation.
//!
//! The engine only consumes indicator series through `IndicatorProvider`:
//! aligned `Vec<f64>` of the input length, `f64::NAN` for warm-up bars,
//! deterministic for identical input. `WilderIndicators` is the provider
//! shipped with the crate; tests substitute fixed series.
//!
//! Warm-up lengths of the built-in provider:
//! - EMA(p): p - 1
//! - +DI(p): p
//! - ADX(p): 2p - 1

pub mod adx;
pub mod ema;
pub mod wilder;

pub use adx::{adx, directional_movement, plus_di};
pub use ema::ema_of_series;
pub use wilder::{true_range, wilder_sum};

use thiserror::Error;

/// Errors from indicator computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("{indicator} period must be >= 1, got {period}")]
    InvalidPeriod {
        indicator: &'static str,
        period: usize,
    },

    #[error("input series lengths differ: high={high}, low={low}, close={close}")]
    LengthMismatch { high: usize, low: usize, close: usize },
}

/// Source of the trend and trend-strength series the signal engine consumes.
pub trait IndicatorProvider: Send + Sync {
    /// Exponential moving average of `close` over `period` bars.
    fn ema(&self, close: &[f64], period: usize) -> Result<Vec<f64>, IndicatorError>;

    /// Average directional index over `period` bars.
    fn adx(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        period: usize,
    ) -> Result<Vec<f64>, IndicatorError>;

    /// Positive directional indicator (+DI) over `period` bars.
    fn plus_di(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        period: usize,
    ) -> Result<Vec<f64>, IndicatorError>;
}

/// Built-in provider: SMA-seeded EMA and Wilder-smoothed directional movement.
#[derive(Debug, Clone, Copy, Default)]
pub struct WilderIndicators;

fn check_period(indicator: &'static str, period: usize) -> Result<(), IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod { indicator, period });
    }
    Ok(())
}

fn check_lengths(high: &[f64], low: &[f64], close: &[f64]) -> Result<(), IndicatorError> {
    if high.len() != low.len() || low.len() != close.len() {
        return Err(IndicatorError::LengthMismatch {
            high: high.len(),
            low: low.len(),
            close: close.len(),
        });
    }
    Ok(())
}

impl IndicatorProvider for WilderIndicators {
    fn ema(&self, close: &[f64], period: usize) -> Result<Vec<f64>, IndicatorError> {
        check_period("EMA", period)?;
        Ok(ema_of_series(close, period))
    }

    fn adx(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        period: usize,
    ) -> Result<Vec<f64>, IndicatorError> {
        check_period("ADX", period)?;
        check_lengths(high, low, close)?;
        Ok(adx(high, low, close, period))
    }

    fn plus_di(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        period: usize,
    ) -> Result<Vec<f64>, IndicatorError> {
        check_period("PLUS_DI", period)?;
        check_lengths(high, low, close)?;
        Ok(plus_di(high, low, close, period))
    }
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
