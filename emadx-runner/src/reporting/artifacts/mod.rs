//! Artifact manager for persisting run outputs.

mod manifest;
mod performance;

use std::path::{Path, PathBuf};

use polars::prelude::PolarsError;
use thiserror::Error;

use emadx_core::data::DataSource;
use emadx_core::fingerprint::RunFingerprint;
use emadx_core::{DataSeries, StrategyRun};

pub use manifest::RunManifest;
pub use performance::{write_performance_csv, write_performance_parquet, PERFORMANCE_COLUMNS};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("parquet export failed: {0}")]
    Parquet(#[from] PolarsError),

    #[error("manifest serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub(crate) fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ExportError + '_ {
    move |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Artifact paths returned after export.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub run_dir: PathBuf,
    pub manifest: PathBuf,
    pub performance_csv: PathBuf,
    pub performance_parquet: PathBuf,
}

/// Manages writing all artifacts for a run.
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    output_dir: PathBuf,
}

impl ArtifactManager {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, ExportError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir).map_err(io_error(&output_dir))?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Save complete run artifacts under `<output_dir>/<run_id>/`.
    pub fn save_run(
        &self,
        fingerprint: &RunFingerprint,
        series: &DataSeries,
        run: &StrategyRun,
        source: DataSource,
    ) -> Result<ArtifactPaths, ExportError> {
        let run_dir = self.output_dir.join(&fingerprint.run_id);
        std::fs::create_dir_all(&run_dir).map_err(io_error(&run_dir))?;

        let manifest_path = run_dir.join("manifest.json");
        manifest::write_manifest(&manifest_path, fingerprint, series, run, source)?;

        let performance_csv = run_dir.join("performance.csv");
        let performance_parquet = run_dir.join("performance.parquet");
        write_performance_csv(&performance_csv, series, run)?;
        write_performance_parquet(&performance_parquet, series, run)?;

        Ok(ArtifactPaths {
            run_dir,
            manifest: manifest_path,
            performance_csv,
            performance_parquet,
        })
    }
}
