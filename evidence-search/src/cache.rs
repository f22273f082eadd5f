//! In-memory cache for aggregated evidence.
//!
//! Caches the final deduplicated, ranked, truncated list keyed by the
//! (normalised query, filters) pair. Uses [`moka`] for async-friendly
//! caching with TTL and automatic eviction. Each aggregator owns its own
//! cache, so the TTL is whatever that aggregator was configured with.

use std::time::Duration;

use moka::future::Cache;

use crate::types::{EvidenceRecord, QueryFilters};

/// Maximum number of cached result sets.
const MAX_CACHE_ENTRIES: u64 = 256;

/// Composite cache key: normalised query + serialised filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Lowercased, trimmed query string.
    query: String,
    /// JSON form of the filters; filters hold an `f64` so they are not
    /// `Hash` themselves.
    filters: String,
}

impl CacheKey {
    /// Build a deterministic cache key from a query and its filters.
    pub fn new(query: &str, filters: &QueryFilters) -> Self {
        Self {
            query: query.trim().to_lowercase(),
            filters: serde_json::to_string(filters).unwrap_or_default(),
        }
    }
}

/// TTL-bounded cache of aggregated evidence lists.
#[derive(Clone)]
pub struct ResultCache {
    inner: Cache<CacheKey, Vec<EvidenceRecord>>,
}

impl ResultCache {
    /// Create a cache whose entries expire after `ttl_seconds`.
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(MAX_CACHE_ENTRIES)
                .time_to_live(Duration::from_secs(ttl_seconds))
                .build(),
        }
    }

    /// Look up cached evidence. Returns `None` on a miss.
    pub async fn get(&self, key: &CacheKey) -> Option<Vec<EvidenceRecord>> {
        self.inner.get(key).await
    }

    /// Store evidence for `key`, replacing any previous entry.
    pub async fn insert(&self, key: CacheKey, records: Vec<EvidenceRecord>) {
        self.inner.insert(key, records).await;
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}
