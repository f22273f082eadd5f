//! Request and answer types for clinical queries.

use chrono::{DateTime, Utc};
use evidence_search::{EvidenceRecord, QueryFilters};
use serde::{Deserialize, Serialize};

use crate::error::{ClinicalError, Result};

/// Message returned when the query is missing or blank.
pub const QUERY_REQUIRED: &str = "Query is required";

/// Inbound clinical query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClinicalRequest {
    /// Free-text clinical question. Required, non-blank.
    pub query: String,
    /// Optional free-text patient description.
    pub patient_context: Option<String>,
    /// Search and framing filters.
    pub filters: QueryFilters,
}

impl ClinicalRequest {
    /// Create a request with default filters.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// The trimmed query.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicalError::InvalidRequest`] if the query is blank.
    pub fn validated_query(&self) -> Result<&str> {
        let query = self.query.trim();
        if query.is_empty() {
            return Err(ClinicalError::InvalidRequest(QUERY_REQUIRED.to_owned()));
        }
        Ok(query)
    }

    /// Patient context, ignoring blank values.
    pub fn patient_context(&self) -> Option<&str> {
        self.patient_context
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// How a [`ClinicalAnswer`] was produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnswerOrigin {
    /// Parsed from the model's JSON reply.
    #[default]
    Model,
    /// The model call failed; the answer is a template.
    ModelUnavailable,
    /// The model replied without a usable JSON object.
    UnparsableOutput,
}

/// Structured answer to a clinical query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalAnswer {
    pub summary: String,
    pub key_findings: Vec<String>,
    pub clinical_recommendations: Vec<String>,
    /// Top-ranked evidence, at most [`crate::synthesize::MAX_SOURCES`].
    pub sources: Vec<EvidenceRecord>,
    pub citations: Vec<String>,
    pub follow_up_suggestions: Vec<String>,
    /// Confidence in `[0.0, 1.0]`.
    pub confidence: f64,
    pub evidence_quality: String,
    pub last_updated: DateTime<Utc>,
    /// Not serialized; lets callers and logs tell fallback answers apart.
    #[serde(skip)]
    pub origin: AnswerOrigin,
}

impl ClinicalAnswer {
    /// Whether the answer came from a fallback path rather than the model.
    pub fn is_fallback(&self) -> bool {
        self.origin != AnswerOrigin::Model
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use evidence_search::DateRange;

    #[test]
    fn request_deserializes_camel_case() {
        let request: ClinicalRequest = serde_json::from_str(
            r#"{
                "query": "statins in elderly",
                "patientContext": "82F, CKD stage 3",
                "filters": {
                    "searchEnabled": true,
                    "deepResearchEnabled": false,
                    "reasonEnabled": true,
                    "dateRange": "last-5-years",
                    "includePreprints": false
                }
            }"#,
        )
        .unwrap();
        assert_eq!(request.query, "statins in elderly");
        assert_eq!(request.patient_context(), Some("82F, CKD stage 3"));
        assert!(request.filters.reason_enabled);
        assert_eq!(request.filters.date_range, Some(DateRange::LastFiveYears));
        assert!(request.filters.excludes_preprints());
    }

    #[test]
    fn missing_fields_default() {
        let request: ClinicalRequest = serde_json::from_str("{}").unwrap();
        assert!(request.query.is_empty());
        assert!(request.patient_context.is_none());
        assert_eq!(request.filters, QueryFilters::default());
    }

    #[test]
    fn blank_query_is_invalid() {
        for query in ["", "   ", "\n\t"] {
            let err = ClinicalRequest::new(query).validated_query().unwrap_err();
            assert!(matches!(err, ClinicalError::InvalidRequest(ref m) if m == QUERY_REQUIRED));
        }
    }

    #[test]
    fn query_is_trimmed() {
        let request = ClinicalRequest::new("  asthma  ");
        assert_eq!(request.validated_query().unwrap(), "asthma");
    }

    #[test]
    fn blank_patient_context_is_none() {
        let request = ClinicalRequest {
            patient_context: Some("  ".into()),
            ..ClinicalRequest::new("q")
        };
        assert!(request.patient_context().is_none());
    }

    #[test]
    fn answer_serializes_camel_case_without_origin() {
        let answer = ClinicalAnswer {
            summary: "s".into(),
            key_findings: vec!["k".into()],
            clinical_recommendations: vec![],
            sources: vec![],
            citations: vec![],
            follow_up_suggestions: vec![],
            confidence: 0.9,
            evidence_quality: "High".into(),
            last_updated: Utc::now(),
            origin: AnswerOrigin::UnparsableOutput,
        };
        let value = serde_json::to_value(&answer).unwrap();
        assert!(value.get("keyFindings").is_some());
        assert!(value.get("clinicalRecommendations").is_some());
        assert!(value.get("followUpSuggestions").is_some());
        assert!(value.get("evidenceQuality").is_some());
        assert!(value.get("lastUpdated").unwrap().is_string());
        assert!(value.get("origin").is_none());
        assert!(answer.is_fallback());
    }
}
