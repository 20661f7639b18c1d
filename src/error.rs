use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned at the file boundary.
pub type Result<T> = std::result::Result<T, RepairError>;

/// Error type covering the failures that can occur while loading, cleaning,
/// or persisting a question workbook.
///
/// The repair pipeline itself is total; these errors only originate from
/// storage, configuration, and the command line.
#[derive(Debug, Error)]
pub enum RepairError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when a configuration file cannot be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a workbook does not contain a usable question sheet.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when a required header is absent from the question sheet.
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
