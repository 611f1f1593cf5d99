//! Artifact export tests.

use emadx_core::data::SyntheticProvider;
use emadx_core::ParameterUpdate;
use emadx_runner::reporting::artifacts::PERFORMANCE_COLUMNS;
use emadx_runner::{BacktestConfig, Backtester, ProviderKind, Report};

fn backtester() -> Backtester {
    let mut config = BacktestConfig::default();
    config.data.provider = ProviderKind::Synthetic;
    config.data.lookback = "1 Y".parse().unwrap();
    Backtester::new(config, &SyntheticProvider::new()).unwrap()
}

#[test]
fn export_before_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let bt = backtester();
    let report = bt.export(dir.path()).unwrap();
    assert_eq!(report, Report::NoResults);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn export_writes_all_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let mut bt = backtester();
    bt.run_strategy().unwrap();

    let paths = bt.export(dir.path()).unwrap().ready().unwrap();
    assert!(paths.manifest.exists());
    assert!(paths.performance_csv.exists());
    assert!(paths.performance_parquet.exists());
    assert!(paths.run_dir.ends_with(&bt.fingerprint().run_id));

    let mut reader = csv::Reader::from_path(&paths.performance_csv).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, PERFORMANCE_COLUMNS);
    let rows = reader.records().count();
    assert_eq!(rows, bt.series().len());
}

#[test]
fn manifest_records_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut bt = backtester();
    bt.run_strategy().unwrap();
    let paths = bt.export(dir.path()).unwrap().ready().unwrap();

    let text = std::fs::read_to_string(&paths.manifest).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["run_id"], bt.fingerprint().run_id.as_str());
    assert_eq!(json["symbol"], "EURUSD=X");
    assert_eq!(json["synthetic"], true);
    assert_eq!(json["source"], "synthetic");
    assert_eq!(json["params"]["short_window"], 5);
    assert_eq!(json["bars"], bt.series().len());
}

#[test]
fn new_parameters_export_to_new_run_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut bt = backtester();
    bt.run_strategy().unwrap();
    let first = bt.export(dir.path()).unwrap().ready().unwrap();

    bt.set_parameters(ParameterUpdate::both(10, 40)).unwrap();
    assert_eq!(bt.export(dir.path()).unwrap(), Report::NoResults);

    bt.run_strategy().unwrap();
    let second = bt.export(dir.path()).unwrap().ready().unwrap();
    assert_ne!(first.run_dir, second.run_dir);
}
