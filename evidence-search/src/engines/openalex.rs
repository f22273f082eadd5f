//! OpenAlex works search.
//!
//! Results are restricted to the Medicine concept. Abstracts arrive as an
//! inverted index and are rebuilt with [`reconstruct_abstract`]; study type
//! is classified from the work's concept tags rather than its title.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::engine::SourceAdapter;
use crate::error::SearchError;
use crate::http::{endpoint, get_json};
use crate::normalize::{build_record, current_year, reconstruct_abstract, RawRecord};
use crate::types::{EvidenceRecord, EvidenceSource, QueryFilters, StudyType};

/// OpenAlex concept ID for Medicine.
const MEDICINE_CONCEPT: &str = "C71924100";
const PER_PAGE: &str = "15";

/// OpenAlex adapter. The shared client must carry a `User-Agent` with a
/// contact address (see [`crate::SearchConfig::user_agent`]).
pub struct OpenAlexAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAlexAdapter {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl SourceAdapter for OpenAlexAdapter {
    async fn fetch(
        &self,
        query: &str,
        filters: &QueryFilters,
    ) -> Result<Vec<EvidenceRecord>, SearchError> {
        let year = current_year();
        let (search, filter) = build_params(query, filters, year);
        tracing::trace!(search, filter, "OpenAlex search");

        let request = self
            .client
            .get(endpoint(&self.base_url, "works"))
            .query(&[
                ("search", search.as_str()),
                ("filter", filter.as_str()),
                ("per-page", PER_PAGE),
            ]);
        let response: WorksResponse = get_json(request, "OpenAlex").await?;
        Ok(parse_works(response, query, year))
    }

    fn source(&self) -> EvidenceSource {
        EvidenceSource::OpenAlex
    }
}

/// Build the `search` and `filter` parameters.
///
/// The study type is added as a search term; the date range and preprint
/// exclusion become comma-joined filter clauses after the concept filter.
pub(crate) fn build_params(
    query: &str,
    filters: &QueryFilters,
    current_year: i32,
) -> (String, String) {
    let mut search = query.trim().to_owned();
    if let Some(term) = filters.study_type_filter().and_then(search_term) {
        search.push(' ');
        search.push_str(term);
    }

    let mut clauses = vec![format!("concepts.id:{MEDICINE_CONCEPT}")];
    if let Some(range) = filters.date_range {
        clauses.push(format!(
            "from_publication_date:{}-01-01",
            range.start_year(current_year)
        ));
    }
    if filters.excludes_preprints() {
        clauses.push("type:article".to_owned());
    }

    (search, clauses.join(","))
}

fn search_term(study_type: StudyType) -> Option<&'static str> {
    match study_type {
        StudyType::Rct => Some("randomized controlled trial"),
        StudyType::MetaAnalysis => Some("meta-analysis"),
        StudyType::SystematicReview => Some("systematic review"),
        StudyType::CohortStudy => Some("cohort"),
        StudyType::CaseControlStudy => Some("case-control"),
        StudyType::Guideline => Some("guideline"),
        StudyType::ResearchArticle => None,
    }
}

/// Works that fail to decode are skipped.
fn parse_works(response: WorksResponse, query: &str, current_year: i32) -> Vec<EvidenceRecord> {
    response
        .results
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| serde_json::from_value::<Work>(value).ok())
        .map(|work| work_to_record(work, query, current_year))
        .collect()
}

fn work_to_record(work: Work, query: &str, current_year: i32) -> EvidenceRecord {
    let doi = work.doi.map(|d| strip_prefix(&d, "https://doi.org/"));
    let pmid = work
        .ids
        .and_then(|ids| ids.pmid)
        .map(|p| strip_prefix(&p, "https://pubmed.ncbi.nlm.nih.gov/").trim_end_matches('/').to_owned());

    let url = match (&doi, &work.id) {
        (Some(doi), _) if !doi.trim().is_empty() => format!("https://doi.org/{doi}"),
        (_, Some(id)) => id.clone(),
        _ => "https://openalex.org".to_owned(),
    };

    let concepts = work
        .concepts
        .unwrap_or_default()
        .into_iter()
        .filter_map(|c| c.display_name)
        .collect::<Vec<_>>()
        .join(" ");

    let raw = RawRecord {
        title: work.title.or(work.display_name),
        authors: work
            .authorships
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| a.author.and_then(|author| author.display_name))
            .collect(),
        journal: work
            .primary_location
            .and_then(|loc| loc.source)
            .and_then(|src| src.display_name),
        year: work.publication_year.map(|y| y.to_string()),
        doi,
        pmid,
        url,
        abstract_text: work
            .abstract_inverted_index
            .as_ref()
            .map(reconstruct_abstract),
        classification_text: Some(concepts),
    };
    build_record(raw, query, EvidenceSource::OpenAlex, current_year)
}

fn strip_prefix(value: &str, prefix: &str) -> String {
    value.strip_prefix(prefix).unwrap_or(value).to_owned()
}

#[derive(Debug, Deserialize)]
struct WorksResponse {
    results: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct Work {
    id: Option<String>,
    title: Option<String>,
    display_name: Option<String>,
    authorships: Option<Vec<Authorship>>,
    primary_location: Option<Location>,
    publication_year: Option<i64>,
    doi: Option<String>,
    ids: Option<WorkIds>,
    abstract_inverted_index: Option<Value>,
    concepts: Option<Vec<Concept>>,
}

#[derive(Debug, Deserialize)]
struct Authorship {
    author: Option<AuthorRef>,
}

#[derive(Debug, Deserialize)]
struct AuthorRef {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Location {
    source: Option<SourceRef>,
}

#[derive(Debug, Deserialize)]
struct SourceRef {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WorkIds {
    pmid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Concept {
    display_name: Option<String>,
}
