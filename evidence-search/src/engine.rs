//! Trait definition for pluggable evidence backends.
//!
//! Each backend (PubMed, Europe PMC, OpenAlex, credible health web)
//! implements [`SourceAdapter`] to provide a uniform interface for querying
//! and normalising results.

use async_trait::async_trait;

use crate::error::SearchError;
use crate::types::{EvidenceRecord, EvidenceSource, QueryFilters};

/// A pluggable evidence backend.
///
/// Implementors handle their own:
///
/// - query construction, including backend-specific filter grammar
/// - HTTP request(s) with appropriate parameters and headers
/// - mapping of the native payload into [`EvidenceRecord`]s
///
/// All implementations must be `Send + Sync` so the aggregator can hold
/// them as `Arc<dyn SourceAdapter>` and query them concurrently.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Query the backend and normalise its results.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails or the response cannot
    /// be decoded.
    async fn fetch(
        &self,
        query: &str,
        filters: &QueryFilters,
    ) -> Result<Vec<EvidenceRecord>, SearchError>;

    /// Which [`EvidenceSource`] this adapter represents.
    fn source(&self) -> EvidenceSource;

    /// Query the backend, containing any failure.
    ///
    /// Errors are logged at warn level and yield an empty list, so one
    /// backend outage never fails the aggregation.
    async fn search(&self, query: &str, filters: &QueryFilters) -> Vec<EvidenceRecord> {
        match self.fetch(query, filters).await {
            Ok(records) => {
                tracing::debug!(source = %self.source(), count = records.len(), "adapter returned records");
                records
            }
            Err(err) => {
                tracing::warn!(source = %self.source(), error = %err, "adapter failed");
                Vec::new()
            }
        }
    }
}
