//! Custom error types for the data checker.
//!
//! Loading failures fall into two classes: the file format could not be
//! determined from the extension, or the file could not be read or parsed.
//! Both are fatal and are surfaced to the caller unchanged.

use thiserror::Error;

use crate::config::ConfigValidationError;

/// The main error type for the data checker.
#[derive(Error, Debug)]
pub enum CheckerError {
    /// The file extension is not one of the supported formats.
    #[error("Unsupported file type: '{extension}' (expected .csv, .xlsx, .xlsm, .xlsb, .xls or .ods)")]
    FileFormat { extension: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    /// Workbook could not be opened or a sheet could not be read.
    #[error("Failed to read workbook: {0}")]
    Workbook(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper (CSV parsing, frame construction).
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CheckerError>,
    },
}

impl CheckerError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CheckerError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for scripted callers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::FileFormat { .. } => "FILE_FORMAT_ERROR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Workbook(_) | Self::Io(_) | Self::Polars(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error means the input file could not be read or parsed.
    pub fn is_io(&self) -> bool {
        self.error_code() == "IO_ERROR"
    }

    /// Check if this error means the input format was not recognized.
    pub fn is_file_format(&self) -> bool {
        self.error_code() == "FILE_FORMAT_ERROR"
    }
}

impl From<calamine::Error> for CheckerError {
    fn from(err: calamine::Error) -> Self {
        CheckerError::Workbook(err.to_string())
    }
}

/// Result type alias for checker operations.
pub type Result<T> = std::result::Result<T, CheckerError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CheckerError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CheckerError::Io(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let error = CheckerError::FileFormat {
            extension: ".txt".to_string(),
        };
        assert_eq!(error.error_code(), "FILE_FORMAT_ERROR");
        assert!(error.is_file_format());
        assert!(!error.is_io());
    }

    #[test]
    fn test_io_class_errors() {
        let io = CheckerError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing.csv",
        ));
        assert!(io.is_io());
        assert!(CheckerError::Workbook("corrupt".to_string()).is_io());
    }

    #[test]
    fn test_with_context() {
        let error = CheckerError::Workbook("bad zip".to_string()).with_context("Loading data.xlsx");
        assert!(error.to_string().contains("Loading data.xlsx"));
        assert_eq!(error.error_code(), "IO_ERROR"); // Preserves original code
    }
}
