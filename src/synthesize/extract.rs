//! Best-effort extraction of the JSON answer from a model reply.
//!
//! Models often wrap the requested object in prose or code fences. Only the
//! greedy span from the first `{` to the last `}` is considered; a reply
//! with several JSON-looking fragments parses only if that whole span is a
//! single valid object.

use serde::Deserialize;
use serde_json::Value;

use evidence_search::normalize::clamp_score;

/// Summary used when the model's object has no `summary`.
pub const DEFAULT_SUMMARY: &str = "Summary not available";

/// Confidence used when the model's object has no numeric `confidence`.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Evidence quality used when the model's object has no `evidenceQuality`.
pub const DEFAULT_EVIDENCE_QUALITY: &str = "Not assessed";

/// The answer fields recovered from a model reply, defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAnswer {
    pub summary: String,
    pub key_findings: Vec<String>,
    pub clinical_recommendations: Vec<String>,
    pub citations: Vec<String>,
    pub follow_up_suggestions: Vec<String>,
    pub confidence: f64,
    pub evidence_quality: String,
}

/// The greedy `{`…`}` span of `text`, if there is one.
pub fn json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse the model's JSON answer out of `text`.
///
/// Returns `None` if there is no span or the span is not a JSON object.
/// Missing or mistyped fields fall back to their defaults; list items
/// that are not strings are kept in their JSON text form.
pub fn parse_model_answer(text: &str) -> Option<ModelAnswer> {
    let span = json_span(text)?;
    let raw: RawAnswer = serde_json::from_str(span).ok()?;

    Some(ModelAnswer {
        summary: raw
            .summary
            .as_ref()
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| DEFAULT_SUMMARY.to_owned()),
        key_findings: string_list(raw.key_findings),
        clinical_recommendations: string_list(raw.clinical_recommendations),
        citations: string_list(raw.citations),
        follow_up_suggestions: string_list(raw.follow_up_suggestions),
        confidence: raw
            .confidence
            .as_ref()
            .and_then(Value::as_f64)
            .map_or(DEFAULT_CONFIDENCE, clamp_score),
        evidence_quality: raw
            .evidence_quality
            .as_ref()
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| DEFAULT_EVIDENCE_QUALITY.to_owned()),
    })
}

fn string_list(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(single)) => vec![single],
        _ => Vec::new(),
    }
}

/// Optional-field schema for the model's object. Deserializing into a
/// struct rejects non-object spans such as `{1, 2}` or arrays.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnswer {
    summary: Option<Value>,
    key_findings: Option<Value>,
    clinical_recommendations: Option<Value>,
    citations: Option<Value>,
    follow_up_suggestions: Option<Value>,
    confidence: Option<Value>,
    evidence_quality: Option<Value>,
}
