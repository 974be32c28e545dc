//! # Error Types

use std::path::PathBuf;

/// Errors from tokencount operations.
#[derive(Debug, thiserror::Error)]
pub enum TokencountError {
    /// The dataset path does not exist.
    #[error("dataset path not found: {}", .0.display())]
    DatasetNotFound(PathBuf),

    /// The run options are unusable.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// A zip container held no file entry.
    #[error("zip archive has no file entries: {}", .0.display())]
    EmptyArchive(PathBuf),

    /// A vocabulary could not be constructed.
    #[error("vocabulary error: {0}")]
    Vocabulary(String),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// CSV decoding error.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// JSON decoding error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Parquet decoding error.
    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Arrow conversion error.
    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    /// Zip container error.
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    /// Worker pool construction error.
    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type for tokencount operations.
pub type TCResult<T> = core::result::Result<T, TokencountError>;
