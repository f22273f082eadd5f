//! # evidence-search
//!
//! Concurrent medical literature search across public bibliographic APIs.
//!
//! This crate queries several evidence backends for a clinical question,
//! normalises each backend's payload into a common [`EvidenceRecord`], and
//! merges the contributions into one deduplicated, ranked list.
//!
//! ## Design
//!
//! - Adapters for PubMed (E-utilities), Europe PMC, OpenAlex, and a
//!   placeholder credible-health-web source
//! - Settle-all fan-out: a failing, hanging, or panicking backend
//!   contributes nothing and never fails the aggregation
//! - Deduplication by DOI, else by title prefix; first seen wins
//! - Ranking by keyword relevance with a publication-year tiebreak
//! - Optional per-aggregator TTL cache
//!
//! ## Security
//!
//! - No API keys required by any backend
//! - No network listeners; this is a library, not a server
//! - Queries are logged only at trace level

pub mod cache;
pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod http;
pub mod normalize;
pub mod orchestrator;
pub mod types;

pub use config::SearchConfig;
pub use engine::SourceAdapter;
pub use error::{Result, SearchError};
pub use orchestrator::Aggregator;
pub use types::{DateRange, EvidenceRecord, EvidenceSource, QueryFilters, StudyType};

/// Aggregate evidence for `query` from the production backends.
///
/// Builds a one-off [`Aggregator`] from `config` and runs it. Callers that
/// serve many queries should build an [`Aggregator`] once and reuse it so
/// the HTTP connection pool and cache are shared.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid. Backend failures
/// are not errors: they are logged and the affected backend contributes no
/// records.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> evidence_search::Result<()> {
/// let config = evidence_search::SearchConfig::default();
/// let filters = evidence_search::QueryFilters::default();
/// let records = evidence_search::aggregate("statins in elderly", &filters, &config).await?;
/// for record in &records {
///     println!("{} ({}): {}", record.title, record.year, record.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn aggregate(
    query: &str,
    filters: &QueryFilters,
    config: &SearchConfig,
) -> Result<Vec<EvidenceRecord>> {
    let aggregator = Aggregator::from_config(config)?;
    Ok(aggregator.aggregate(query, filters).await)
}
