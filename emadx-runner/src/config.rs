//! Serializable backtest configuration.
//!
//! Loaded from TOML; every field has a default, so an empty file (or no file
//! at all) describes the classic EURUSD 5/20 EMA run with ADX(7) and +DI(14)
//! gated at 25.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use emadx_core::data::{parse_end_timestamp, BarSize, DataError, HistoryRequest, Lookback};
use emadx_core::params::{DEFAULT_ADX_PERIOD, DEFAULT_DI_PERIOD};
use emadx_core::{ParameterStore, SignalEngine, StrengthPeriods, DEFAULT_THRESHOLD};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error(transparent)]
    Data(#[from] DataError),
}

/// Which data provider a run fetches from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Csv,
    Synthetic,
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yahoo" => Ok(ProviderKind::Yahoo),
            "csv" => Ok(ProviderKind::Csv),
            "synthetic" => Ok(ProviderKind::Synthetic),
            other => Err(ConfigError::Invalid {
                field: "data.provider",
                reason: format!("'{other}' (expected yahoo, csv or synthetic)"),
            }),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProviderKind::Yahoo => "yahoo",
            ProviderKind::Csv => "csv",
            ProviderKind::Synthetic => "synthetic",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    pub symbol: String,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            symbol: "EURUSD=X".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub provider: ProviderKind,
    /// End timestamp, e.g. `"20211231 10:00:00"` or `"2021-12-31"`.
    pub end: String,
    pub lookback: Lookback,
    pub bar_size: BarSize,
    pub timeout_secs: u64,
    pub csv_path: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Yahoo,
            end: "20211231 10:00:00".to_string(),
            lookback: Lookback::years(3),
            bar_size: BarSize::Day,
            timeout_secs: 30,
            csv_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub short_window: usize,
    pub long_window: usize,
    pub threshold: f64,
    pub adx_period: usize,
    pub di_period: usize,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        let windows = ParameterStore::default();
        Self {
            short_window: windows.short(),
            long_window: windows.long(),
            threshold: DEFAULT_THRESHOLD,
            adx_period: DEFAULT_ADX_PERIOD,
            di_period: DEFAULT_DI_PERIOD,
        }
    }
}

/// Full configuration of one backtest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub instrument: InstrumentConfig,
    pub data: DataConfig,
    pub strategy: StrategyConfig,
}

impl BacktestConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no run could use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instrument.symbol.trim().is_empty() {
            return Err(invalid("instrument.symbol", "must not be empty"));
        }
        let s = &self.strategy;
        for (field, value) in [
            ("strategy.short_window", s.short_window),
            ("strategy.long_window", s.long_window),
            ("strategy.adx_period", s.adx_period),
            ("strategy.di_period", s.di_period),
        ] {
            if value == 0 {
                return Err(invalid(field, "must be >= 1"));
            }
        }
        if !s.threshold.is_finite() || s.threshold < 0.0 {
            return Err(ConfigError::Invalid {
                field: "strategy.threshold",
                reason: format!("must be finite and non-negative, got {}", s.threshold),
            });
        }
        if self.data.timeout_secs == 0 {
            return Err(invalid("data.timeout_secs", "must be >= 1"));
        }
        if self.data.provider == ProviderKind::Csv && self.data.csv_path.is_none() {
            return Err(invalid("data.csv_path", "required when provider is csv"));
        }
        parse_end_timestamp(&self.data.end)?;
        Ok(())
    }

    pub fn history_request(&self) -> Result<HistoryRequest, ConfigError> {
        Ok(HistoryRequest {
            symbol: self.instrument.symbol.clone(),
            end: parse_end_timestamp(&self.data.end)?,
            lookback: self.data.lookback,
            bar_size: self.data.bar_size,
        })
    }

    pub fn parameter_store(&self) -> ParameterStore {
        ParameterStore::new(self.strategy.short_window, self.strategy.long_window)
    }

    pub fn strength_periods(&self) -> StrengthPeriods {
        StrengthPeriods {
            adx: self.strategy.adx_period,
            di_plus: self.strategy.di_period,
        }
    }

    pub fn signal_engine(&self) -> SignalEngine {
        SignalEngine::new(self.strategy.threshold)
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_run() {
        let config = BacktestConfig::default();
        assert_eq!(config.instrument.symbol, "EURUSD=X");
        assert_eq!(config.data.lookback, Lookback::years(3));
        assert_eq!(config.data.bar_size, BarSize::Day);
        assert_eq!(config.strategy.short_window, 5);
        assert_eq!(config.strategy.long_window, 20);
        assert_eq!(config.strategy.threshold, 25.0);
        assert_eq!(config.strength_periods(), StrengthPeriods { adx: 7, di_plus: 14 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(BacktestConfig::from_toml("").unwrap(), BacktestConfig::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let config = BacktestConfig::from_toml(
            r#"
            [instrument]
            symbol = "SPY"

            [data]
            provider = "synthetic"
            lookback = "6 M"
            bar_size = "1 week"

            [strategy]
            long_window = 50
            threshold = 20.0
            "#,
        )
        .unwrap();
        assert_eq!(config.instrument.symbol, "SPY");
        assert_eq!(config.data.provider, ProviderKind::Synthetic);
        assert_eq!(config.data.lookback.to_string(), "6 M");
        assert_eq!(config.data.bar_size, BarSize::Week);
        assert_eq!(config.strategy.short_window, 5);
        assert_eq!(config.strategy.long_window, 50);
        assert_eq!(config.signal_engine().threshold(), 20.0);
    }

    #[test]
    fn bad_lookback_is_parse_error() {
        let err = BacktestConfig::from_toml("[data]\nlookback = \"3 parsecs\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = BacktestConfig::default();
        config.strategy.short_window = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "strategy.short_window", .. })
        ));

        let mut config = BacktestConfig::default();
        config.strategy.threshold = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = BacktestConfig::default();
        config.data.provider = ProviderKind::Csv;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "data.csv_path", .. })
        ));

        let mut config = BacktestConfig::default();
        config.data.end = "soon".into();
        assert!(matches!(config.validate(), Err(ConfigError::Data(_))));
    }

    #[test]
    fn history_request_from_config() {
        let req = BacktestConfig::default().history_request().unwrap();
        assert_eq!(req.symbol, "EURUSD=X");
        assert_eq!(req.end.to_string(), "2021-12-31 10:00:00");
        assert_eq!(req.lookback, Lookback::years(3));
    }

    #[test]
    fn provider_kind_parses() {
        assert_eq!("CSV".parse::<ProviderKind>().unwrap(), ProviderKind::Csv);
        assert!("bloomberg".parse::<ProviderKind>().is_err());
        assert_eq!(ProviderKind::Synthetic.to_string(), "synthetic");
    }
}
