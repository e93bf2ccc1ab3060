//! Error types for the chat-report library.
//!
//! This module provides custom error types using `thiserror` for better error handling
//! and more specific error messages throughout the pipeline.

use thiserror::Error;

/// Errors that can occur while building a chat report.
#[derive(Error, Debug)]
pub enum ChatReportError {
    /// Malformed input table: missing columns, unparseable values
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Sentiment scoring failure
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Chart rendering failure
    #[error("Failed to render chart {chart}: {message}")]
    Render {
        /// File name of the chart being drawn
        chart: String,
        /// Backend error description
        message: String,
    },

    /// Invalid or unknown template placeholder
    #[error("Template error: {0}")]
    Template(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

/// Errors raised by a [`crate::sentiment::SentimentClassifier`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifierError {
    /// Text exceeds the configured maximum length
    #[error("text too long ({len} chars, max {max})")]
    TextTooLong {
        /// Length of the rejected text in characters
        len: usize,
        /// Configured maximum
        max: usize,
    },

    /// The model produced a value outside [0, 1]
    #[error("score out of range: {0}")]
    InvalidScore(f64),

    /// Backend-specific failure
    #[error("{0}")]
    Backend(String),
}

/// Convenience type alias for Result with ChatReportError
pub type Result<T> = std::result::Result<T, ChatReportError>;

impl From<anyhow::Error> for ChatReportError {
    fn from(err: anyhow::Error) -> Self {
        ChatReportError::Other(err.to_string())
    }
}

impl From<csv::Error> for ChatReportError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(io) => ChatReportError::Io(io),
                other => ChatReportError::DataFormat(format!("{other:?}")),
            }
        } else {
            ChatReportError::DataFormat(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_error_wraps() {
        let err: ChatReportError = ClassifierError::TextTooLong { len: 20, max: 10 }.into();
        assert!(matches!(err, ChatReportError::Classifier(_)));
        assert_eq!(
            err.to_string(),
            "Classifier error: text too long (20 chars, max 10)"
        );
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: ChatReportError = anyhow::anyhow!("boom").into();
        assert_eq!(err.to_string(), "boom");
    }
}
