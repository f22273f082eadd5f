//! Europe PMC REST search.
//!
//! A single `search` call with `resultType=core` returns full metadata
//! including abstracts, so no follow-up request is needed.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::engine::SourceAdapter;
use crate::error::SearchError;
use crate::http::{endpoint, get_json};
use crate::normalize::{build_record, current_year, RawRecord};
use crate::types::{EvidenceRecord, EvidenceSource, QueryFilters, StudyType};

const PAGE_SIZE: &str = "15";

/// Europe PMC adapter.
pub struct EuropePmcAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl EuropePmcAdapter {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl SourceAdapter for EuropePmcAdapter {
    async fn fetch(
        &self,
        query: &str,
        filters: &QueryFilters,
    ) -> Result<Vec<EvidenceRecord>, SearchError> {
        let year = current_year();
        let search_query = build_query(query, filters, year);
        tracing::trace!(search_query, "Europe PMC search");

        let request = self
            .client
            .get(endpoint(&self.base_url, "search"))
            .query(&[
                ("query", search_query.as_str()),
                ("resultType", "core"),
                ("pageSize", PAGE_SIZE),
                ("format", "json"),
            ]);
        let response: EpmcResponse = get_json(request, "Europe PMC").await?;
        Ok(parse_response(response, query, year))
    }

    fn source(&self) -> EvidenceSource {
        EvidenceSource::EuropePmc
    }
}

/// Build the Europe PMC query with year, publication-type and preprint clauses.
pub(crate) fn build_query(query: &str, filters: &QueryFilters, current_year: i32) -> String {
    let mut q = query.trim().to_owned();
    if let Some(range) = filters.date_range {
        let from = range.start_year(current_year);
        q.push_str(&format!(" AND PUB_YEAR:[{from} TO {current_year}]"));
    }
    if let Some(pub_type) = filters.study_type_filter().and_then(publication_type) {
        q.push_str(&format!(" AND PUB_TYPE:\"{pub_type}\""));
    }
    if filters.excludes_preprints() {
        q.push_str(" AND NOT SRC:PPR");
    }
    q
}

fn publication_type(study_type: StudyType) -> Option<&'static str> {
    match study_type {
        StudyType::Rct => Some("randomized controlled trial"),
        StudyType::MetaAnalysis => Some("meta-analysis"),
        StudyType::SystematicReview => Some("systematic-review"),
        StudyType::Guideline => Some("practice guideline"),
        StudyType::CohortStudy | StudyType::CaseControlStudy | StudyType::ResearchArticle => None,
    }
}

/// Items that fail to decode are skipped.
fn parse_response(response: EpmcResponse, query: &str, current_year: i32) -> Vec<EvidenceRecord> {
    response
        .result_list
        .and_then(|list| list.result)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| serde_json::from_value::<EpmcResult>(value).ok())
        .map(|item| item_to_record(item, query, current_year))
        .collect()
}

fn item_to_record(item: EpmcResult, query: &str, current_year: i32) -> EvidenceRecord {
    let authors = match item.author_list.and_then(|l| l.author) {
        Some(list) if !list.is_empty() => list.into_iter().filter_map(|a| a.full_name).collect(),
        _ => item
            .author_string
            .as_deref()
            .map(split_author_string)
            .unwrap_or_default(),
    };

    let journal = item
        .journal_info
        .and_then(|info| info.journal)
        .and_then(|j| j.title)
        .or(item.journal_title);

    let doi = item.doi.filter(|d| !d.trim().is_empty());
    let url = match (&doi, &item.source, &item.id) {
        (Some(doi), _, _) => format!("https://doi.org/{}", doi.trim()),
        (None, Some(source), Some(id)) => format!("https://europepmc.org/article/{source}/{id}"),
        _ => "https://europepmc.org".to_owned(),
    };

    let raw = RawRecord {
        title: item.title,
        authors,
        journal,
        year: item.pub_year,
        doi,
        pmid: item.pmid,
        url,
        abstract_text: item.abstract_text,
        classification_text: None,
    };
    build_record(raw, query, EvidenceSource::EuropePmc, current_year)
}

/// Split `"Smith J, Doe A, Lee K."` into individual names.
fn split_author_string(raw: &str) -> Vec<String> {
    raw.trim()
        .trim_end_matches('.')
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_owned)
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EpmcResponse {
    result_list: Option<EpmcResultList>,
}

#[derive(Debug, Deserialize)]
struct EpmcResultList {
    result: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EpmcResult {
    id: Option<String>,
    source: Option<String>,
    pmid: Option<String>,
    doi: Option<String>,
    title: Option<String>,
    author_string: Option<String>,
    author_list: Option<EpmcAuthorList>,
    journal_info: Option<EpmcJournalInfo>,
    journal_title: Option<String>,
    pub_year: Option<String>,
    abstract_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EpmcAuthorList {
    author: Option<Vec<EpmcAuthor>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EpmcAuthor {
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EpmcJournalInfo {
    journal: Option<EpmcJournal>,
}

#[derive(Debug, Deserialize)]
struct EpmcJournal {
    title: Option<String>,
}
