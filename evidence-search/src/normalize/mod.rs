//! Normalisation of backend-native records into [`EvidenceRecord`]s.
//!
//! Every adapter maps its payload into a [`RawRecord`] (all fields optional)
//! and hands it to [`build_record`], which applies the placeholder text,
//! year parsing, study-type classification and relevance scoring shared by
//! all backends.

pub mod inverted_index;

use chrono::Datelike;

use crate::types::{
    EvidenceRecord, EvidenceSource, StudyType, NO_ABSTRACT, NO_TITLE, UNKNOWN_JOURNAL,
};

pub use inverted_index::reconstruct_abstract;

/// Ordered study-type markers. The first marker found wins.
const STUDY_TYPE_MARKERS: &[(&str, StudyType)] = &[
    ("randomized", StudyType::Rct),
    ("rct", StudyType::Rct),
    ("meta-analysis", StudyType::MetaAnalysis),
    ("systematic review", StudyType::SystematicReview),
    ("cohort", StudyType::CohortStudy),
    ("case-control", StudyType::CaseControlStudy),
    ("guideline", StudyType::Guideline),
];

/// Score added per query token found in the title.
const TERM_WEIGHT: f64 = 0.1;

/// A backend record before normalisation. Every field may be missing.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub journal: Option<String>,
    /// Free-form date or year text, e.g. `"2021 Mar 4"` or `"2019"`.
    pub year: Option<String>,
    pub doi: Option<String>,
    pub pmid: Option<String>,
    pub url: String,
    pub abstract_text: Option<String>,
    /// Text scanned for study-type markers. Defaults to the title.
    pub classification_text: Option<String>,
}

/// Turn a [`RawRecord`] into a normalised [`EvidenceRecord`].
///
/// Missing title, journal and abstract become the documented placeholders;
/// blank identifiers become `None`; the relevance score is computed against
/// the title and clamped to `[0.0, 1.0]`.
pub fn build_record(
    raw: RawRecord,
    query: &str,
    source: EvidenceSource,
    current_year: i32,
) -> EvidenceRecord {
    let title = non_blank(raw.title).unwrap_or_else(|| NO_TITLE.to_owned());
    let study_type = match non_blank(raw.classification_text) {
        Some(text) => classify_study_type(&text),
        None => classify_study_type(&title),
    };
    let relevance_score = relevance_score(query, &title);

    EvidenceRecord {
        authors: raw
            .authors
            .into_iter()
            .map(|a| a.trim().to_owned())
            .filter(|a| !a.is_empty())
            .collect(),
        journal: non_blank(raw.journal).unwrap_or_else(|| UNKNOWN_JOURNAL.to_owned()),
        year: parse_year(raw.year.as_deref(), current_year),
        doi: non_blank(raw.doi),
        pmid: non_blank(raw.pmid),
        url: raw.url,
        abstract_text: non_blank(raw.abstract_text).unwrap_or_else(|| NO_ABSTRACT.to_owned()),
        study_type,
        relevance_score,
        source,
        title,
    }
}

/// Classify a study design from free text.
///
/// Case-insensitive substring scan over the ordered marker list; the first
/// match wins and no match yields [`StudyType::ResearchArticle`].
pub fn classify_study_type(text: &str) -> StudyType {
    let lowered = text.to_lowercase();
    STUDY_TYPE_MARKERS
        .iter()
        .find(|(marker, _)| lowered.contains(marker))
        .map_or(StudyType::ResearchArticle, |(_, study_type)| *study_type)
}

/// Term-overlap relevance of a title to a query.
///
/// Each whitespace-separated, lowercased query token that occurs as a
/// substring of the lowercased title adds `0.1`; the total is capped at
/// `1.0`. Repeated tokens count once per occurrence in the query.
pub fn relevance_score(query: &str, title: &str) -> f64 {
    let title = title.to_lowercase();
    let mut score = 0.0;
    for token in query.to_lowercase().split_whitespace() {
        if title.contains(token) {
            score += TERM_WEIGHT;
        }
    }
    clamp_score(score)
}

/// Clamp a score into `[0.0, 1.0]`, mapping NaN to 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 1.0)
}

/// Extract a four-digit year from free-form date text.
///
/// Takes the first run of exactly four ASCII digits not starting with `0`;
/// falls back to `current_year` when none is found.
pub fn parse_year(raw: Option<&str>, current_year: i32) -> i32 {
    let Some(raw) = raw else {
        return current_year;
    };
    let bytes = raw.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        if !bytes[start].is_ascii_digit() {
            start += 1;
            continue;
        }
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end - start == 4 && bytes[start] != b'0' {
            if let Ok(year) = raw[start..end].parse::<i32>() {
                return year;
            }
        }
        start = end;
    }
    current_year
}

/// The current calendar year (UTC).
pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// Truncate to at most `max_chars` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_owned(),
        None => text.to_owned(),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
