//! Credible health web source.
//!
//! There is no web-search backend behind this adapter yet: it contributes a
//! single guideline-style record pointing readers at a recognised guideline
//! body. Its relevance is fixed rather than computed, and the record carries
//! no bibliographic identifiers, so it is easy to tell apart from real
//! evidence and to replace with a real integration later.

use async_trait::async_trait;

use crate::engine::SourceAdapter;
use crate::error::SearchError;
use crate::normalize::current_year;
use crate::types::{EvidenceRecord, EvidenceSource, QueryFilters, StudyType};

/// Fixed relevance of the placeholder record.
pub const HEALTH_WEB_RELEVANCE: f64 = 0.8;

const GUIDELINE_BODY: &str = "World Health Organization";

/// Placeholder adapter for credible health websites.
#[derive(Debug, Default)]
pub struct HealthWebAdapter;

#[async_trait]
impl SourceAdapter for HealthWebAdapter {
    async fn fetch(
        &self,
        query: &str,
        _filters: &QueryFilters,
    ) -> Result<Vec<EvidenceRecord>, SearchError> {
        Ok(vec![placeholder_record(query, current_year())])
    }

    fn source(&self) -> EvidenceSource {
        EvidenceSource::HealthWeb
    }
}

fn placeholder_record(query: &str, year: i32) -> EvidenceRecord {
    let topic = query.trim();
    EvidenceRecord {
        title: format!("Clinical guidance: {topic}"),
        authors: vec![GUIDELINE_BODY.to_owned()],
        journal: "WHO Guidelines".to_owned(),
        year,
        doi: None,
        pmid: None,
        url: "https://www.who.int/publications/who-guidelines".to_owned(),
        abstract_text: format!(
            "Guidance from recognised health organisations relevant to {topic}. \
             Consult the current published guideline for dosing and monitoring details."
        ),
        study_type: StudyType::Guideline,
        relevance_score: HEALTH_WEB_RELEVANCE,
        source: EvidenceSource::HealthWeb,
    }
}
