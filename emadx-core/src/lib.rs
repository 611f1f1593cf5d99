//! emadx core: bars, data providers, indicators, and the strategy evaluation engine.
//!
//! This crate contains the vectorized EMA/ADX backtest:
//! - Domain types (bars, positions)
//! - Data provider boundary (Yahoo Finance, CSV import, synthetic)
//! - Indicator boundary with a built-in Wilder implementation (EMA, ADX, +DI)
//! - `DataSeries`, the column-oriented per-bar record
//! - `SignalEngine`: EMA crossover gated by ADX and +DI
//! - `PerformanceEvaluator`: strategy returns and cumulative performance curves
//! - `ParameterStore`: value-oriented recomputation of the trend columns

pub mod data;
pub mod domain;
pub mod fingerprint;
pub mod indicators;
pub mod params;
pub mod performance;
pub mod series;
pub mod signal;

pub use domain::{Bar, Position};
pub use indicators::{IndicatorError, IndicatorProvider, WilderIndicators};
pub use params::{ParameterStore, ParameterUpdate, StrengthPeriods};
pub use performance::{EvalError, PerformanceEvaluator, PerformanceSummary, StrategyRun};
pub use series::{DataSeries, IndicatorColumn, SeriesError};
pub use signal::{SignalEngine, DEFAULT_THRESHOLD};
