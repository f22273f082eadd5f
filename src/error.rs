//! Error types for the clinical synthesis service.

use evidence_search::SearchError;

/// Top-level error type for the clinical query pipeline.
///
/// Only [`ClinicalError::InvalidRequest`] and the internal variants ever
/// reach an HTTP caller; model failures are recovered by the synthesizer's
/// fallback answers.
#[derive(Debug, thiserror::Error)]
pub enum ClinicalError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Language model request or response error.
    #[error("model error: {0}")]
    Model(String),

    /// The caller sent a request the pipeline cannot run.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Unexpected failure inside the pipeline.
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Evidence search setup error.
    #[error("search error: {0}")]
    Search(#[from] SearchError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ClinicalError>;
