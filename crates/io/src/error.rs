use std::path::PathBuf;

use sprintlens_recon::ReconError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no .xlsx files found in {}", .0.display())]
    NoInputFile(PathBuf),
    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),
    /// Workbook could not be opened or a sheet could not be read.
    #[error("workbook error: {0}")]
    Workbook(String),
    #[error("header row {row} not found (file has {available} rows)")]
    MissingHeader { row: usize, available: usize },
    #[error("missing key column '{0}'")]
    MissingKeyColumn(String),
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("XLSX write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error(transparent)]
    Recon(#[from] ReconError),
}
