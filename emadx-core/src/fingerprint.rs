//! Run fingerprinting: deterministic identification of a backtest run.
//!
//! - `dataset_hash`: BLAKE3 over symbol, dates and OHLC of the price series.
//! - `StrategyParams`: every knob that changes the signal.
//! - `RunFingerprint`: dataset hash + params, hashed into a run id.

use serde::{Deserialize, Serialize};

use crate::params::{ParameterStore, StrengthPeriods};
use crate::series::DataSeries;

/// Hash of the price columns. Indicator columns are excluded: they are a
/// function of the prices and the parameters, which are hashed separately.
pub fn dataset_hash(series: &DataSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(series.symbol().as_bytes());
    for t in 0..series.len() {
        hasher.update(series.dates()[t].to_string().as_bytes());
        hasher.update(&series.open()[t].to_le_bytes());
        hasher.update(&series.high()[t].to_le_bytes());
        hasher.update(&series.low()[t].to_le_bytes());
        hasher.update(&series.close()[t].to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// All parameters that influence positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    pub short_window: usize,
    pub long_window: usize,
    pub threshold: f64,
    pub adx_period: usize,
    pub di_period: usize,
}

impl StrategyParams {
    pub fn new(windows: &ParameterStore, periods: StrengthPeriods, threshold: f64) -> Self {
        Self {
            short_window: windows.short(),
            long_window: windows.long(),
            threshold,
            adx_period: periods.adx,
            di_period: periods.di_plus,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFingerprint {
    pub run_id: String,
    pub dataset_hash: String,
    pub params: StrategyParams,
}

impl RunFingerprint {
    pub fn new(dataset_hash: String, params: StrategyParams) -> Self {
        // serde_json object keys are sorted, so this string is canonical.
        let canonical = serde_json::json!({
            "dataset_hash": dataset_hash,
            "params": params,
        })
        .to_string();
        let run_id = blake3::hash(canonical.as_bytes()).to_hex().to_string();
        Self {
            run_id,
            dataset_hash,
            params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::make_bars;

    fn params(short: usize) -> StrategyParams {
        StrategyParams::new(
            &ParameterStore::new(short, 20),
            StrengthPeriods::default(),
            25.0,
        )
    }

    #[test]
    fn dataset_hash_is_deterministic_and_price_sensitive() {
        let a = DataSeries::from_bars("X", &make_bars(&[1.0, 2.0, 3.0])).unwrap();
        let b = DataSeries::from_bars("X", &make_bars(&[1.0, 2.0, 3.0])).unwrap();
        let c = DataSeries::from_bars("X", &make_bars(&[1.0, 2.0, 3.5])).unwrap();
        assert_eq!(dataset_hash(&a), dataset_hash(&b));
        assert_ne!(dataset_hash(&a), dataset_hash(&c));
        assert_eq!(dataset_hash(&a).len(), 64);
    }

    #[test]
    fn run_id_changes_with_params() {
        let a = RunFingerprint::new("abc".into(), params(5));
        let b = RunFingerprint::new("abc".into(), params(5));
        let c = RunFingerprint::new("abc".into(), params(6));
        assert_eq!(a.run_id, b.run_id);
        assert_ne!(a.run_id, c.run_id);
    }
}
