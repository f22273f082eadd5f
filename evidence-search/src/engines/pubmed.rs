//! PubMed via NCBI E-utilities.
//!
//! Two sequential calls: `esearch` returns matching PMIDs, `esummary`
//! expands them into document summaries. Summaries carry no abstract, so
//! records from this backend use the "not available" placeholder.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::engine::SourceAdapter;
use crate::error::SearchError;
use crate::http::{endpoint, get_json};
use crate::normalize::{build_record, current_year, RawRecord};
use crate::types::{EvidenceRecord, EvidenceSource, QueryFilters, StudyType};

/// Maximum PMIDs requested from `esearch`.
const RETMAX: &str = "20";

/// PubMed E-utilities adapter.
pub struct PubMedAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl PubMedAdapter {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn search_ids(&self, term: &str) -> Result<Vec<String>, SearchError> {
        let request = self
            .client
            .get(endpoint(&self.base_url, "esearch.fcgi"))
            .query(&[
                ("db", "pubmed"),
                ("term", term),
                ("retmax", RETMAX),
                ("retmode", "json"),
                ("sort", "relevance"),
            ]);
        let response: ESearchResponse = get_json(request, "PubMed esearch").await?;
        Ok(response
            .esearchresult
            .and_then(|r| r.idlist)
            .unwrap_or_default())
    }

    async fn summaries(&self, ids: &[String]) -> Result<Map<String, Value>, SearchError> {
        let joined = ids.join(",");
        let request = self
            .client
            .get(endpoint(&self.base_url, "esummary.fcgi"))
            .query(&[("db", "pubmed"), ("id", joined.as_str()), ("retmode", "json")]);
        let response: ESummaryResponse = get_json(request, "PubMed esummary").await?;
        response
            .result
            .ok_or_else(|| SearchError::Parse("PubMed esummary has no result object".into()))
    }
}

#[async_trait]
impl SourceAdapter for PubMedAdapter {
    async fn fetch(
        &self,
        query: &str,
        filters: &QueryFilters,
    ) -> Result<Vec<EvidenceRecord>, SearchError> {
        let year = current_year();
        let term = build_term(query, filters, year);
        tracing::trace!(term, "PubMed search");

        let ids = self.search_ids(&term).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = self.summaries(&ids).await?;
        Ok(parse_summaries(&result, query, year))
    }

    fn source(&self) -> EvidenceSource {
        EvidenceSource::PubMed
    }
}

/// Build the PubMed `term` with date and publication-type clauses.
pub(crate) fn build_term(query: &str, filters: &QueryFilters, current_year: i32) -> String {
    let mut term = query.trim().to_owned();
    if let Some(range) = filters.date_range {
        let from = range.start_year(current_year);
        term.push_str(&format!(
            " AND (\"{from}\"[dp] : \"{current_year}\"[dp])"
        ));
    }
    if let Some(clause) = filters.study_type_filter().and_then(publication_type_clause) {
        term.push_str(" AND ");
        term.push_str(clause);
    }
    term
}

fn publication_type_clause(study_type: StudyType) -> Option<&'static str> {
    match study_type {
        StudyType::Rct => Some("randomized controlled trial[pt]"),
        StudyType::MetaAnalysis => Some("meta-analysis[pt]"),
        StudyType::SystematicReview => Some("systematic review[pt]"),
        StudyType::Guideline => Some("guideline[pt]"),
        StudyType::CohortStudy => Some("cohort studies[mh]"),
        StudyType::CaseControlStudy => Some("case-control studies[mh]"),
        StudyType::ResearchArticle => None,
    }
}

/// Map an `esummary` result object into records, in `uids` order.
///
/// Entries that are missing or fail to decode are skipped.
pub(crate) fn parse_summaries(
    result: &Map<String, Value>,
    query: &str,
    current_year: i32,
) -> Vec<EvidenceRecord> {
    let uids: Vec<&str> = result
        .get("uids")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    uids.into_iter()
        .filter_map(|uid| {
            let doc: SummaryDoc = serde_json::from_value(result.get(uid)?.clone()).ok()?;
            Some(summary_to_record(uid, doc, query, current_year))
        })
        .collect()
}

fn summary_to_record(uid: &str, doc: SummaryDoc, query: &str, current_year: i32) -> EvidenceRecord {
    let doi = doc
        .articleids
        .unwrap_or_default()
        .into_iter()
        .find(|id| id.idtype.as_deref() == Some("doi"))
        .and_then(|id| id.value);

    let raw = RawRecord {
        title: doc.title,
        authors: doc
            .authors
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| a.name)
            .collect(),
        journal: doc.fulljournalname.or(doc.source),
        year: doc.pubdate,
        doi,
        pmid: Some(uid.to_owned()),
        url: format!("https://pubmed.ncbi.nlm.nih.gov/{uid}/"),
        abstract_text: None,
        classification_text: None,
    };
    build_record(raw, query, EvidenceSource::PubMed, current_year)
}

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    esearchresult: Option<ESearchResult>,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    idlist: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ESummaryResponse {
    result: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct SummaryDoc {
    title: Option<String>,
    authors: Option<Vec<SummaryAuthor>>,
    fulljournalname: Option<String>,
    source: Option<String>,
    pubdate: Option<String>,
    articleids: Option<Vec<ArticleId>>,
}

#[derive(Debug, Deserialize)]
struct SummaryAuthor {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleId {
    idtype: Option<String>,
    value: Option<String>,
}
