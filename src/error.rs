//! Error types for split detection and execution.
//!
//! Most failures inside the detection pass never surface here: page text and
//! detector failures are logged and treated as missing evidence. What remains
//! are load, configuration and persistence errors.

use std::time::Duration;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading, analyzing or splitting a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The PDF backend rejected the document
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Page index outside the document
    #[error("Page {index} out of range (document has {page_count} pages)")]
    PageOutOfRange {
        /// Requested 0-based page index
        index: usize,
        /// Number of pages in the document
        page_count: usize,
    },

    /// External OCR capability failed
    #[error("OCR error: {0}")]
    Ocr(String),

    /// External program exceeded its hard timeout
    #[error("{program} timed out after {timeout:?}")]
    OcrTimeout {
        /// Program that was killed
        program: String,
        /// Timeout that expired
        timeout: Duration,
    },

    /// Persisting an output section failed
    #[error("Failed to write {section} section: {reason}")]
    SplitIo {
        /// Section name ("PO" or "router")
        section: String,
        /// Underlying failure
        reason: String,
    },

    /// Configuration value rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Pattern table failed to compile
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<lopdf::Error> for Error {
    fn from(e: lopdf::Error) -> Self {
        Error::Pdf(e.to_string())
    }
}

impl Error {
    pub(crate) fn split_io(section: &str, reason: impl std::fmt::Display) -> Self {
        Error::SplitIo {
            section: section.to_string(),
            reason: reason.to_string(),
        }
    }
}
