//! Evidence orchestrator: concurrent fan-out, dedup, ranking.
//!
//! This module fans out a query to every source adapter concurrently,
//! deduplicates records by DOI or title prefix, ranks them by relevance
//! with a recency tiebreak, and returns a truncated result set.

pub mod aggregate;
pub mod dedup;
pub mod ranking;

pub use aggregate::{merge_and_rank, Aggregator};
