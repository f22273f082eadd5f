//! Error types for the evidence-search crate.
//!
//! Backend errors never reach the caller of the aggregator: every adapter
//! swallows its own failures and contributes an empty list instead, after
//! logging a stable, descriptive message. Only configuration errors are
//! returned to callers.

/// Errors that can occur while querying a literature backend.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// An HTTP request to a backend failed or returned an error status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A backend response could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// A backend did not answer within the per-adapter timeout.
    #[error("search timed out: {0}")]
    Timeout(String),

    /// The backend task failed in an unexpected way (e.g. panicked).
    #[error("backend error: {0}")]
    Backend(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for evidence-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
