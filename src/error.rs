//! Custom error types for billmerge
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of failures, used for logging and exit behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A declared input path does not exist
    SourceNotFound,
    /// A source lacks a required column
    SchemaIncomplete,
    /// Tabular structure or text encoding could not be parsed
    ParseMalformed,
    /// Anything else
    Unexpected,
}

/// The main error type for billmerge operations
#[derive(Error, Debug)]
pub enum BillError {
    /// An input file does not exist
    #[error("Source file not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// A source export lacks columns of the common schema
    #[error("{source_name} export is missing required columns: {}", missing.join(", "))]
    SchemaIncomplete {
        source_name: String,
        missing: Vec<String>,
    },

    /// CSV structure or text encoding errors
    #[error("Malformed input: {0}")]
    ParseMalformed(String),

    /// An amount cell that does not parse as a decimal
    #[error("Invalid amount: '{value}'")]
    InvalidAmount { value: String },

    /// The directory an output file should land in does not exist
    #[error("Output directory does not exist: {}", path.display())]
    MissingOutputDir { path: PathBuf },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),
}

impl BillError {
    /// Create a malformed-input error with context
    pub fn malformed(context: impl Into<String>) -> Self {
        Self::ParseMalformed(context.into())
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SourceNotFound { .. } => ErrorKind::SourceNotFound,
            Self::SchemaIncomplete { .. } => ErrorKind::SchemaIncomplete,
            Self::ParseMalformed(_) => ErrorKind::ParseMalformed,
            _ => ErrorKind::Unexpected,
        }
    }

    /// Check if this is a schema-incompleteness error
    pub fn is_schema_incomplete(&self) -> bool {
        matches!(self, Self::SchemaIncomplete { .. })
    }
}

impl From<std::io::Error> for BillError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<csv::Error> for BillError {
    fn from(err: csv::Error) -> Self {
        Self::ParseMalformed(err.to_string())
    }
}

impl From<serde_json::Error> for BillError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for billmerge operations
pub type BillResult<T> = Result<T, BillError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BillError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_schema_incomplete_display() {
        let err = BillError::SchemaIncomplete {
            source_name: "支付宝".into(),
            missing: vec!["备注".into(), "交易时间".into()],
        };
        assert_eq!(
            err.to_string(),
            "支付宝 export is missing required columns: 备注, 交易时间"
        );
        assert!(err.is_schema_incomplete());
        assert_eq!(err.kind(), ErrorKind::SchemaIncomplete);
    }

    #[test]
    fn test_kinds() {
        let err = BillError::SourceNotFound {
            path: PathBuf::from("bill/alipay.csv"),
        };
        assert_eq!(err.kind(), ErrorKind::SourceNotFound);
        assert_eq!(err.to_string(), "Source file not found: bill/alipay.csv");

        let err = BillError::InvalidAmount { value: "abc".into() };
        assert_eq!(err.kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: BillError = io_err.into();
        assert!(matches!(err, BillError::Io(_)));
    }
}
