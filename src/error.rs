use std::path::PathBuf;
use thiserror::Error;

// Everything that can abort a preprocessing run. None of these are retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing required columns for {transform}: {fields:?}")]
    MissingColumns {
        transform: String,
        fields: Vec<String>,
    },

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("no CSV files found in {dir}")]
    NoCsvFiles { dir: PathBuf },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("row {row}: cannot parse {value:?} as a date")]
    InvalidDate { row: usize, value: String },

    #[error("failed to write JSON to {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
