//! Core types: normalised evidence records, study-type tags, evidence
//! sources, and the request filters every adapter reads.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Placeholder title for records whose source omits one.
pub const NO_TITLE: &str = "No title available";
/// Placeholder abstract for records whose source omits one.
pub const NO_ABSTRACT: &str = "Abstract not available";
/// Placeholder journal name for records whose source omits one.
pub const UNKNOWN_JOURNAL: &str = "Unknown journal";

/// A single piece of evidence, normalised from any backend.
///
/// Records are built once by an adapter and never mutated afterwards;
/// downstream stages only filter and reorder them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceRecord {
    pub title: String,
    pub authors: Vec<String>,
    pub journal: String,
    /// Four-digit publication year; the current year when the source value
    /// was missing or unparseable.
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmid: Option<String>,
    pub url: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub study_type: StudyType,
    /// Term-overlap relevance, always within `[0.0, 1.0]`.
    pub relevance_score: f64,
    /// Which backend produced this record.
    pub source: EvidenceSource,
}

impl EvidenceRecord {
    /// Whether the abstract is the "not available" placeholder.
    pub fn has_abstract(&self) -> bool {
        !self.abstract_text.trim().is_empty() && self.abstract_text != NO_ABSTRACT
    }

    /// First listed author, if any.
    pub fn first_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }
}

/// Heuristic study-design classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StudyType {
    #[serde(rename = "RCT")]
    Rct,
    #[serde(rename = "Meta-analysis")]
    MetaAnalysis,
    #[serde(rename = "Systematic Review")]
    SystematicReview,
    #[serde(rename = "Cohort Study")]
    CohortStudy,
    #[serde(rename = "Case-Control Study")]
    CaseControlStudy,
    #[serde(rename = "Guideline")]
    Guideline,
    #[serde(rename = "Research Article")]
    ResearchArticle,
}

impl StudyType {
    /// Human-readable label, identical to the serialised form.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Rct => "RCT",
            Self::MetaAnalysis => "Meta-analysis",
            Self::SystematicReview => "Systematic Review",
            Self::CohortStudy => "Cohort Study",
            Self::CaseControlStudy => "Case-Control Study",
            Self::Guideline => "Guideline",
            Self::ResearchArticle => "Research Article",
        }
    }

    /// Parse a filter tag such as `rct`, `meta-analysis` or `Cohort Study`.
    ///
    /// Returns `None` for `all`, blank input, and unknown tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let normalised = tag.trim().to_lowercase().replace(['_', ' '], "-");
        match normalised.as_str() {
            "rct" | "randomized-controlled-trial" => Some(Self::Rct),
            "meta-analysis" | "metaanalysis" => Some(Self::MetaAnalysis),
            "systematic-review" => Some(Self::SystematicReview),
            "cohort" | "cohort-study" => Some(Self::CohortStudy),
            "case-control" | "case-control-study" => Some(Self::CaseControlStudy),
            "guideline" | "guidelines" => Some(Self::Guideline),
            "research-article" => Some(Self::ResearchArticle),
            _ => None,
        }
    }
}

impl fmt::Display for StudyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The backends evidence can come from, in fan-out order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EvidenceSource {
    /// NCBI E-utilities over PubMed.
    PubMed,
    /// Europe PMC REST search.
    EuropePmc,
    /// OpenAlex works search.
    OpenAlex,
    /// Generic credible-health-web source.
    HealthWeb,
}

impl EvidenceSource {
    /// Returns the human-readable name of this source.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PubMed => "PubMed",
            Self::EuropePmc => "Europe PMC",
            Self::OpenAlex => "OpenAlex",
            Self::HealthWeb => "Health Web",
        }
    }

    /// Returns all sources in fan-out order.
    pub fn all() -> &'static [EvidenceSource] {
        &[Self::PubMed, Self::EuropePmc, Self::OpenAlex, Self::HealthWeb]
    }
}

impl fmt::Display for EvidenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Publication date window requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateRange {
    #[serde(rename = "last-year")]
    LastYear,
    #[serde(rename = "last-2-years")]
    LastTwoYears,
    #[serde(rename = "last-5-years")]
    LastFiveYears,
}

impl DateRange {
    /// Parse the wire tag; unknown tags (e.g. `all`) mean "no date filter".
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim() {
            "last-year" => Some(Self::LastYear),
            "last-2-years" => Some(Self::LastTwoYears),
            "last-5-years" => Some(Self::LastFiveYears),
            _ => None,
        }
    }

    /// Number of years the window reaches back.
    pub fn years_back(&self) -> i32 {
        match self {
            Self::LastYear => 1,
            Self::LastTwoYears => 2,
            Self::LastFiveYears => 5,
        }
    }

    /// First year included in the window, given the current year.
    pub fn start_year(&self, current_year: i32) -> i32 {
        current_year - self.years_back()
    }

    /// Human-readable description used in prompts.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::LastYear => "Last 12 months",
            Self::LastTwoYears => "Last 2 years",
            Self::LastFiveYears => "Last 5 years",
        }
    }
}

/// Request filters. Read-only input to adapters and the prompt builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryFilters {
    pub search_enabled: bool,
    pub deep_research_enabled: bool,
    pub reason_enabled: bool,
    #[serde(deserialize_with = "lenient_date_range")]
    pub date_range: Option<DateRange>,
    pub study_type: Option<String>,
    pub region: Option<String>,
    pub publication_status: Option<String>,
    pub min_quality_score: f64,
    pub include_preprints: Option<bool>,
}

impl QueryFilters {
    /// The study type to restrict backends to, if any.
    ///
    /// `all`, blank, and unrecognised tags yield `None`.
    pub fn study_type_filter(&self) -> Option<StudyType> {
        self.study_type.as_deref().and_then(StudyType::from_tag)
    }

    /// Whether preprints were explicitly excluded.
    pub fn excludes_preprints(&self) -> bool {
        self.include_preprints == Some(false)
    }

    /// The requested region, ignoring blank values.
    pub fn region(&self) -> Option<&str> {
        self.region
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

fn lenient_date_range<'de, D>(deserializer: D) -> Result<Option<DateRange>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(DateRange::parse))
}
