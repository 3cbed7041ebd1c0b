//! Error handling for the dashboard pipeline.

use std::io;
use std::path::{Path, PathBuf};

use parquet::errors::ParquetError;

/// Specialized error type for dashboard operations
#[derive(Debug, thiserror::Error)]
pub enum EhrBoardError {
    /// Error opening or reading a file
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    /// Error processing Arrow data
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),
    /// Error reading or writing Parquet data
    #[error("Parquet error: {0}")]
    ParquetError(#[from] ParquetError),
    /// Error parsing JSON documents
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Error converting between record batches and typed rows
    #[error("Conversion error: {0}")]
    ConversionError(#[from] serde_arrow::Error),
    /// Error talking to the document database
    #[error("Database error: {0}")]
    DatabaseError(#[from] mongodb::error::Error),
    /// Error parsing a PDF document
    #[error("PDF error: {0}")]
    PdfError(#[from] lopdf::Error),
    /// Error with table schema or column layout
    #[error("Schema error: {0}")]
    SchemaError(String),
    /// A source produced no usable rows
    #[error("Empty table: {0}")]
    EmptyTable(String),
    /// The persisted model artifact is missing
    #[error("Model artifact not found: {0}")]
    ModelNotFound(PathBuf),
    /// Error during model training or prediction
    #[error("Training error: {0}")]
    TrainingError(String),
    /// Error rendering a chart
    #[error("Chart error: {0}")]
    ChartError(String),
}

/// Result type for dashboard operations
pub type Result<T> = std::result::Result<T, EhrBoardError>;

/// Check that a path exists and is a regular file before handing it to a loader
///
/// # Arguments
/// * `path` - The path to check
/// * `purpose` - Why the file is needed (for error context)
pub fn ensure_file(path: &Path, purpose: &str) -> Result<()> {
    if !path.exists() {
        return Err(EhrBoardError::IoError(io::Error::new(
            io::ErrorKind::NotFound,
            format!("File not found: {} (needed for {purpose})", path.display()),
        )));
    }
    if !path.is_file() {
        return Err(EhrBoardError::IoError(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Path is not a file: {} (expected a file for {purpose})", path.display()),
        )));
    }
    Ok(())
}
