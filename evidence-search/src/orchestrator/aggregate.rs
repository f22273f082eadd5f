//! Evidence aggregator: concurrent settle-all fan-out, dedup, rank, truncate.
//!
//! Queries every adapter concurrently, concatenates their contributions in
//! adapter order, deduplicates by DOI/title prefix, ranks by composite
//! score, and keeps the top `max_results`.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;

use crate::cache::{CacheKey, ResultCache};
use crate::config::SearchConfig;
use crate::engine::SourceAdapter;
use crate::engines;
use crate::error::SearchError;
use crate::types::{EvidenceRecord, EvidenceSource, QueryFilters};

use super::dedup::deduplicate;
use super::ranking::rank;

/// Runs a fixed, ordered set of adapters and merges their evidence.
pub struct Aggregator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    max_results: usize,
    timeout: Duration,
    cache: Option<ResultCache>,
}

impl Aggregator {
    /// Create an aggregator over `adapters`, in the order given.
    ///
    /// Limits and caching come from `config`; its endpoints are ignored.
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>, config: &SearchConfig) -> Self {
        let cache = (config.cache_ttl_seconds > 0)
            .then(|| ResultCache::new(config.cache_ttl_seconds));
        Self {
            adapters,
            max_results: config.max_results,
            timeout: Duration::from_secs(config.adapter_timeout_seconds),
            cache,
        }
    }

    /// Create an aggregator over the production adapters.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid, or
    /// [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let adapters = engines::default_adapters(config)?;
        Ok(Self::new(adapters, config))
    }

    /// The adapters in fan-out order.
    pub fn sources(&self) -> Vec<EvidenceSource> {
        self.adapters.iter().map(|a| a.source()).collect()
    }

    /// Aggregate evidence for `query`.
    ///
    /// # Pipeline
    ///
    /// 1. Fan out to every adapter concurrently with
    ///    [`futures::future::join_all`]; each call is isolated with
    ///    `catch_unwind` and bounded by `adapter_timeout_seconds`, which
    ///    covers every request the adapter makes
    /// 2. Log failed adapters at warn level; they contribute nothing
    /// 3. Concatenate contributions in adapter order (not completion order)
    /// 4. Deduplicate, rank, truncate to `max_results`
    ///
    /// Never fails: if every adapter fails the result is empty.
    pub async fn aggregate(&self, query: &str, filters: &QueryFilters) -> Vec<EvidenceRecord> {
        let key = CacheKey::new(query, filters);
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&key).await {
                tracing::debug!(count = hit.len(), "evidence cache hit");
                return hit;
            }
        }

        let futures = self.adapters.iter().map(|adapter| {
            let source = adapter.source();
            let call = AssertUnwindSafe(adapter.search(query, filters)).catch_unwind();
            async move {
                let outcome = match tokio::time::timeout(self.timeout, call).await {
                    Ok(Ok(records)) => Ok(records),
                    Ok(Err(_)) => Err(SearchError::Backend(format!("{source} adapter panicked"))),
                    Err(_) => Err(SearchError::Timeout(format!(
                        "{source} exceeded {}s",
                        self.timeout.as_secs()
                    ))),
                };
                (source, outcome)
            }
        });

        let outcomes = futures::future::join_all(futures).await;

        let mut contributions = Vec::with_capacity(outcomes.len());
        for (source, outcome) in outcomes {
            match outcome {
                Ok(records) => contributions.push(records),
                Err(err) => {
                    tracing::warn!(%source, error = %err, "adapter contributed no evidence");
                }
            }
        }

        let merged = merge_and_rank(contributions, self.max_results);
        tracing::debug!(count = merged.len(), "evidence aggregated");

        if let Some(cache) = &self.cache {
            if !merged.is_empty() {
                cache.insert(key, merged.clone()).await;
            }
        }
        merged
    }
}

/// Concatenate per-adapter contributions in order, then dedup, rank and
/// truncate.
///
/// Pure and deterministic: identical contributions always produce an
/// identical ordered result.
pub fn merge_and_rank(
    contributions: Vec<Vec<EvidenceRecord>>,
    max_results: usize,
) -> Vec<EvidenceRecord> {
    let all: Vec<EvidenceRecord> = contributions.into_iter().flatten().collect();
    let mut ranked = rank(deduplicate(all));
    ranked.truncate(max_results);
    ranked
}
