//! Reporting: console summary, chart data, and artifact export.
//!
//! Nothing here draws. `ChartData` carries the two series groups a plot of
//! the run shows (cumulative curves; close with both trends) so any frontend
//! can render them.

pub mod artifacts;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use emadx_core::{DataSeries, PerformanceSummary, StrategyRun};

pub use artifacts::{ArtifactManager, ArtifactPaths, ExportError, RunManifest};

pub const NO_RESULTS_MESSAGE: &str = "No results to plot yet. Run a strategy.";

/// Outcome of a reporting call. Asking for a report before any run is an
/// informational state, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Report<T> {
    Ready(T),
    NoResults,
}

impl<T> Report<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Report::Ready(_))
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Report::Ready(value) => Some(value),
            Report::NoResults => None,
        }
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            Report::Ready(_) => None,
            Report::NoResults => Some(NO_RESULTS_MESSAGE),
        }
    }
}

/// Plot-ready columns of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub title: String,
    pub dates: Vec<NaiveDate>,
    /// Buy-and-hold growth of one unit.
    pub cum_buyhold: Vec<f64>,
    /// Strategy growth of one unit.
    pub cum_strategy: Vec<f64>,
    pub close: Vec<f64>,
    pub short_trend: Vec<f64>,
    pub long_trend: Vec<f64>,
}

impl ChartData {
    pub fn new(title: String, series: &DataSeries, run: &StrategyRun) -> Self {
        Self {
            title,
            dates: series.dates().to_vec(),
            cum_buyhold: run.cum_buyhold.clone(),
            cum_strategy: run.cum_strategy.clone(),
            close: series.close().to_vec(),
            short_trend: series.short_trend().to_vec(),
            long_trend: series.long_trend().to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// The two headline lines printed after a run.
pub fn format_summary(summary: &PerformanceSummary) -> String {
    format!(
        "Gross performance of strategy {:.2}\n\nOut-/underperformance of strategy {:.2}",
        summary.gross_performance, summary.outperformance
    )
}

/// Headline lines plus the diagnostic figures.
pub fn format_details(summary: &PerformanceSummary) -> String {
    format!(
        "final strategy    {:.4}\n\
         final buy & hold  {:.4}\n\
         position changes  {}\n\
         time long         {:.1}%\n\
         max DD strategy   {:.2}%\n\
         max DD buy & hold {:.2}%",
        summary.final_strategy,
        summary.final_buyhold,
        summary.position_changes,
        summary.long_fraction * 100.0,
        summary.strategy_max_drawdown * 100.0,
        summary.buyhold_max_drawdown * 100.0,
    )
}
