//! emadx runner: backtest orchestration on top of `emadx-core`.
//!
//! This crate provides:
//! - TOML configuration with defaults for every field
//! - `Backtester`: fetch once, attach indicators, run, update windows, rerun
//! - Reporting: console summary, chart data, CSV/Parquet/JSON artifacts

pub mod backtester;
pub mod config;
pub mod reporting;

pub use backtester::{make_provider, BacktestError, Backtester};
pub use config::{
    BacktestConfig, ConfigError, DataConfig, InstrumentConfig, ProviderKind, StrategyConfig,
};
pub use reporting::{ChartData, Report, NO_RESULTS_MESSAGE};
