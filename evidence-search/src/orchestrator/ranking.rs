//! Composite ranking of deduplicated evidence.
//!
//! Formula: `score = relevance_score + year / 10000`
//!
//! The year term is a recency tiebreak: for any realistic year it adds less
//! than 0.25 in total and differs by 0.0001 per year, so it separates
//! records with equal relevance without overriding a relevance gap of 0.1.

use std::cmp::Ordering;

use crate::types::EvidenceRecord;

/// Divisor applied to the publication year in the composite score.
const YEAR_DIVISOR: f64 = 10_000.0;

/// Composite ranking score of a record.
pub fn composite_score(record: &EvidenceRecord) -> f64 {
    record.relevance_score + f64::from(record.year) / YEAR_DIVISOR
}

/// Sort records by descending composite score.
///
/// The sort is stable, so records with equal scores keep their
/// first-seen order.
pub fn rank(mut records: Vec<EvidenceRecord>) -> Vec<EvidenceRecord> {
    records.sort_by(|a, b| {
        composite_score(b)
            .partial_cmp(&composite_score(a))
            .unwrap_or(Ordering::Equal)
    });
    records
}
