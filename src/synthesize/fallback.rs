//! Deterministic answers used when the model cannot provide one.
//!
//! Two tiers stay distinct: a model that could not be reached yields a
//! templated summary at confidence 0.7; a model that replied without a
//! usable JSON object has its raw text surfaced at confidence 0.8.

use evidence_search::EvidenceRecord;
use evidence_search::normalize::truncate_chars;

use super::extract::DEFAULT_EVIDENCE_QUALITY;
use crate::types::AnswerOrigin;

/// Confidence of a templated answer after a failed model call.
pub const MODEL_UNAVAILABLE_CONFIDENCE: f64 = 0.7;

/// Confidence of an answer built from an unparsable reply.
pub const UNPARSABLE_OUTPUT_CONFIDENCE: f64 = 0.8;

/// Characters of the raw reply kept as the summary.
pub const RAW_SUMMARY_CHARS: usize = 500;

/// Records cited after a failed model call.
pub const MODEL_UNAVAILABLE_CITATIONS: usize = 5;

/// Records cited after an unparsable reply.
pub const UNPARSABLE_OUTPUT_CITATIONS: usize = 3;

pub const FALLBACK_KEY_FINDINGS: [&str; 2] = [
    "Automated synthesis was not available; review the retrieved sources directly.",
    "Consult current peer-reviewed literature for outcome data relevant to this query.",
];

pub const FALLBACK_RECOMMENDATIONS: [&str; 2] = [
    "Follow current clinical practice guidelines for this condition.",
    "Confirm decisions against up-to-date literature and local protocols.",
];

pub const FALLBACK_FOLLOW_UPS: [&str; 3] = [
    "What are the current first-line treatment options?",
    "Which patient factors modify the expected benefit or risk?",
    "What monitoring is recommended during and after treatment?",
];

/// The non-source fields of a fallback answer.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackContent {
    pub summary: String,
    pub key_findings: Vec<String>,
    pub clinical_recommendations: Vec<String>,
    pub citations: Vec<String>,
    pub follow_up_suggestions: Vec<String>,
    pub confidence: f64,
    pub evidence_quality: String,
    pub origin: AnswerOrigin,
}

/// Tier 1: the model call failed.
pub fn model_unavailable(query: &str, evidence: &[EvidenceRecord]) -> FallbackContent {
    let summary = format!(
        "An automated evidence synthesis for \"{}\" could not be generated. \
         The retrieved sources are listed below; review them together with current \
         clinical guidelines.",
        query.trim()
    );
    fallback(
        summary,
        citations(evidence, MODEL_UNAVAILABLE_CITATIONS),
        MODEL_UNAVAILABLE_CONFIDENCE,
        AnswerOrigin::ModelUnavailable,
    )
}

/// Tier 2: the model replied without a usable JSON object.
pub fn unparsable_output(raw_reply: &str, evidence: &[EvidenceRecord]) -> FallbackContent {
    fallback(
        truncate_chars(raw_reply, RAW_SUMMARY_CHARS),
        citations(evidence, UNPARSABLE_OUTPUT_CITATIONS),
        UNPARSABLE_OUTPUT_CONFIDENCE,
        AnswerOrigin::UnparsableOutput,
    )
}

/// `"<first author> et al. (<year>)"` for each of the top `limit` records.
pub fn citations(evidence: &[EvidenceRecord], limit: usize) -> Vec<String> {
    evidence
        .iter()
        .take(limit)
        .map(|record| {
            format!(
                "{} et al. ({})",
                record.first_author().unwrap_or("Unknown author"),
                record.year
            )
        })
        .collect()
}

fn fallback(
    summary: String,
    citations: Vec<String>,
    confidence: f64,
    origin: AnswerOrigin,
) -> FallbackContent {
    FallbackContent {
        summary,
        key_findings: to_owned_list(&FALLBACK_KEY_FINDINGS),
        clinical_recommendations: to_owned_list(&FALLBACK_RECOMMENDATIONS),
        citations,
        follow_up_suggestions: to_owned_list(&FALLBACK_FOLLOW_UPS),
        confidence,
        evidence_quality: DEFAULT_EVIDENCE_QUALITY.to_owned(),
        origin,
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}
