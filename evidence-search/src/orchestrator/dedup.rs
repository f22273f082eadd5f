//! Evidence deduplication by DOI or title prefix.
//!
//! Two records are duplicates when they share a DOI, or when neither has a
//! DOI and their titles share the first 50 characters. The first record
//! seen for a key survives; input order is otherwise preserved.

use std::collections::HashSet;

use crate::types::EvidenceRecord;

/// Number of title characters used as the key for records without a DOI.
pub const TITLE_KEY_CHARS: usize = 50;

/// The deduplication key of a record: its DOI if present, else the first
/// [`TITLE_KEY_CHARS`] characters of its title.
pub fn dedup_key(record: &EvidenceRecord) -> String {
    match &record.doi {
        Some(doi) => doi.clone(),
        None => record.title.chars().take(TITLE_KEY_CHARS).collect(),
    }
}

/// Drop every record whose key was already seen, keeping first-seen order.
pub fn deduplicate(records: Vec<EvidenceRecord>) -> Vec<EvidenceRecord> {
    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(dedup_key(record)))
        .collect()
}
