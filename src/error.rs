use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the transformation pipeline, configuration and export.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Excel error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Unknown run id {0}")]
    UnknownRun(u32),

    #[error("Unknown column '{name}' (available: {available})")]
    UnknownColumn { name: String, available: String },

    #[error("No output columns selected")]
    EmptySelection,

    #[error("{rows} rows exceed the spreadsheet limit of {limit}")]
    TooManyRows { rows: usize, limit: usize },

    #[error("Unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("No simulation library path configured; run `config set-library-path <DIR>`")]
    MissingLibraryPath,

    #[error("Simulation library not found in {}: {reason}", .path.display())]
    InvalidLibraryPath { path: PathBuf, reason: String },

    #[error("Native project {} must be read through the simulation library at {}; export the results to .json, .csv or .parquet first", .project.display(), .library.display())]
    ExternalReader { project: PathBuf, library: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;
