//! The EMA/ADX backtester: one instrument, one fetched series, many runs.
//!
//! Lifecycle:
//! 1. `Backtester::new` fetches bars once and attaches all indicator columns.
//! 2. `run_strategy` computes positions and performance curves and keeps them.
//! 3. `set_parameters` swaps a trend window and drops the stale results.
//! 4. `chart_data` / `export` read the kept results, or report `NoResults`.

use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use emadx_core::data::{
    CsvProvider, DataError, DataProvider, DataSource, FetchResult, SyntheticProvider,
    YahooProvider,
};
use emadx_core::fingerprint::{dataset_hash, RunFingerprint, StrategyParams};
use emadx_core::{
    Bar, DataSeries, EvalError, IndicatorError, IndicatorProvider, ParameterStore,
    ParameterUpdate, PerformanceEvaluator, PerformanceSummary, SeriesError, SignalEngine,
    StrategyRun, StrengthPeriods, WilderIndicators,
};

use crate::config::{BacktestConfig, ConfigError, DataConfig, ProviderKind};
use crate::reporting::artifacts::{ArtifactManager, ArtifactPaths, ExportError};
use crate::reporting::{ChartData, Report};

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Build the provider named by the data section of a config.
pub fn make_provider(data: &DataConfig) -> Result<Box<dyn DataProvider>, BacktestError> {
    let provider: Box<dyn DataProvider> = match data.provider {
        ProviderKind::Yahoo => Box::new(YahooProvider::with_timeout(Duration::from_secs(
            data.timeout_secs,
        ))?),
        ProviderKind::Csv => {
            let path = data.csv_path.as_ref().ok_or(ConfigError::Invalid {
                field: "data.csv_path",
                reason: "required when provider is csv".to_string(),
            })?;
            Box::new(CsvProvider::new(path))
        }
        ProviderKind::Synthetic => Box::new(SyntheticProvider::new()),
    };
    Ok(provider)
}

pub struct Backtester {
    config: BacktestConfig,
    source: DataSource,
    series: DataSeries,
    params: ParameterStore,
    periods: StrengthPeriods,
    engine: SignalEngine,
    indicators: Box<dyn IndicatorProvider>,
    results: Option<StrategyRun>,
}

impl std::fmt::Debug for Backtester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backtester")
            .field("symbol", &self.series.symbol())
            .field("bars", &self.series.len())
            .field("source", &self.source)
            .field("params", &self.params)
            .field("threshold", &self.engine.threshold())
            .field("has_results", &self.results.is_some())
            .finish()
    }
}

impl Backtester {
    /// Validate the config, fetch history, and attach indicators with the
    /// built-in provider.
    pub fn new(config: BacktestConfig, data: &dyn DataProvider) -> Result<Self, BacktestError> {
        config.validate()?;
        let request = config.history_request()?;
        info!(
            provider = data.name(),
            symbol = %request.symbol,
            end = %request.end,
            lookback = %request.lookback,
            bar_size = %request.bar_size,
            "fetching history"
        );
        let fetched = data.fetch(&request)?;
        Self::from_fetch(config, fetched, Box::new(WilderIndicators))
    }

    /// Build from already-fetched bars with a caller-supplied indicator provider.
    pub fn from_fetch(
        config: BacktestConfig,
        fetched: FetchResult,
        indicators: Box<dyn IndicatorProvider>,
    ) -> Result<Self, BacktestError> {
        config.validate()?;
        let bars: Vec<Bar> = fetched.bars.into_iter().map(Bar::from).collect();
        if bars.is_empty() {
            return Err(DataError::EmptyHistory {
                symbol: fetched.symbol,
            }
            .into());
        }

        let params = config.parameter_store();
        let periods = config.strength_periods();
        let series =
            DataSeries::build(fetched.symbol, &bars, &params, periods, indicators.as_ref())?;
        info!(
            symbol = series.symbol(),
            bars = series.len(),
            warmup = series.warmup_bars(),
            source = ?fetched.source,
            "series ready"
        );

        Ok(Self {
            engine: config.signal_engine(),
            config,
            source: fetched.source,
            series,
            params,
            periods,
            indicators,
            results: None,
        })
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    pub fn series(&self) -> &DataSeries {
        &self.series
    }

    pub fn parameters(&self) -> ParameterStore {
        self.params
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn is_synthetic(&self) -> bool {
        self.source.is_synthetic()
    }

    /// Results of the last run, if any run happened since the last
    /// parameter change.
    pub fn results(&self) -> Option<&StrategyRun> {
        self.results.as_ref()
    }

    /// Change one or both trend windows. Only the affected columns are
    /// recomputed; any previous results are dropped.
    pub fn set_parameters(&mut self, update: ParameterUpdate) -> Result<(), BacktestError> {
        if update.is_empty() {
            return Ok(());
        }
        // Work on a copy so a failed update leaves the series intact.
        let series = self
            .params
            .set(self.series.clone(), update, self.indicators.as_ref())?;
        self.series = series;
        self.config.strategy.short_window = self.params.short();
        self.config.strategy.long_window = self.params.long();
        self.results = None;
        debug!(
            short = self.params.short(),
            long = self.params.long(),
            "parameters updated"
        );
        Ok(())
    }

    /// Compute positions and performance over the whole series.
    pub fn run_strategy(&mut self) -> Result<&PerformanceSummary, BacktestError> {
        let positions = self.engine.positions(&self.series);
        let run = PerformanceEvaluator::new().evaluate(&self.series, &positions)?;
        info!(
            short = self.params.short(),
            long = self.params.long(),
            threshold = self.engine.threshold(),
            gross = run.summary.gross_performance,
            outperformance = run.summary.outperformance,
            "strategy run complete"
        );
        let run = self.results.insert(run);
        Ok(&run.summary)
    }

    pub fn fingerprint(&self) -> RunFingerprint {
        RunFingerprint::new(
            dataset_hash(&self.series),
            StrategyParams::new(&self.params, self.periods, self.engine.threshold()),
        )
    }

    /// Chart title in the `EMA1=5, EMA2=20` form.
    pub fn title(&self) -> String {
        format!("EMA1={}, EMA2={}", self.params.short(), self.params.long())
    }

    pub fn chart_data(&self) -> Report<ChartData> {
        match &self.results {
            Some(run) => Report::Ready(ChartData::new(self.title(), &self.series, run)),
            None => Report::NoResults,
        }
    }

    /// Write performance CSV/Parquet and the run manifest under
    /// `output_dir/<run_id>/`.
    pub fn export(&self, output_dir: &Path) -> Result<Report<ArtifactPaths>, BacktestError> {
        let run = match &self.results {
            Some(run) => run,
            None => return Ok(Report::NoResults),
        };
        let manager = ArtifactManager::new(output_dir)?;
        let paths = manager.save_run(
            &self.fingerprint(),
            &self.series,
            run,
            self.source,
        )?;
        info!(dir = %paths.run_dir.display(), "artifacts written");
        Ok(Report::Ready(paths))
    }
}
