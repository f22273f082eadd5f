//! Prompt construction for evidence synthesis.
//!
//! [`build_prompt`] is a pure function: identical inputs always render the
//! same text. The rendered prompt is the user message; [`SYSTEM_PROMPT`] is
//! sent alongside it as the system message.

use std::fmt::Write as _;

use evidence_search::normalize::truncate_chars;
use evidence_search::{EvidenceRecord, QueryFilters};

/// System message sent with every synthesis request.
pub const SYSTEM_PROMPT: &str = "You are a clinical evidence synthesis assistant. \
Reply with exactly one JSON object and no other text.";

/// Characters of each abstract included in the prompt.
pub const ABSTRACT_EXCERPT_CHARS: usize = 400;

/// Authors listed per record before "et al.".
const MAX_LISTED_AUTHORS: usize = 3;

const PERSONA: &str = "You are an experienced clinician and evidence-based medicine \
specialist supporting licensed healthcare professionals at the point of care. \
Synthesize the numbered evidence below into a concise, accurate answer. Ground every \
statement in that evidence where possible and say plainly when it is insufficient.";

const MISSING_ABSTRACT: &str =
    "Abstract not available — please infer from the title and study type";

const NO_EVIDENCE: &str = "No indexed evidence was retrieved for this query. Answer from \
established clinical knowledge, state explicitly that no supporting literature was \
retrieved, and lower your confidence accordingly.";

const RESPONSE_FORMAT: &str = r#"RESPONSE FORMAT:
Respond with a single JSON object and nothing else, using exactly these keys:
{
  "summary": "2-3 sentence direct answer to the clinical query",
  "keyFindings": ["finding with numbers where the evidence gives them"],
  "clinicalRecommendations": ["specific, actionable recommendation"],
  "citations": ["First author et al. (year)"],
  "followUpSuggestions": ["related clinical question worth asking next"],
  "confidence": 0.0,
  "evidenceQuality": "High | Moderate | Low | Very low",
  "lastUpdated": "ISO-8601 timestamp"
}
Style:
- Keep every item short and actionable.
- Be numerically specific: doses, effect sizes, intervals, NNT where available.
- List at most 3 key findings.
- Refer to evidence by number, e.g. [1], in findings and recommendations.
- confidence is a number between 0 and 1 reflecting the strength of the evidence."#;

/// Render the synthesis prompt.
///
/// Sections, in order: persona, `CLINICAL QUERY`, `PATIENT CONTEXT` (only
/// when non-blank), `SEARCH PARAMETERS`, `EVIDENCE` (numbered from 1, or a
/// no-evidence notice), `RESPONSE FORMAT`.
pub fn build_prompt(
    query: &str,
    patient_context: Option<&str>,
    evidence: &[EvidenceRecord],
    filters: &QueryFilters,
) -> String {
    let mut prompt = String::with_capacity(2048 + evidence.len() * 700);

    prompt.push_str(PERSONA);
    prompt.push_str("\n\n");

    let _ = writeln!(prompt, "CLINICAL QUERY:\n{}\n", query.trim());

    if let Some(context) = patient_context.map(str::trim).filter(|c| !c.is_empty()) {
        let _ = writeln!(prompt, "PATIENT CONTEXT:\n{context}\n");
    }

    push_search_parameters(&mut prompt, filters);
    push_evidence(&mut prompt, evidence, filters.region());

    prompt.push_str(RESPONSE_FORMAT);
    prompt.push('\n');
    prompt
}

fn push_search_parameters(prompt: &mut String, filters: &QueryFilters) {
    let search_mode = if filters.search_enabled {
        "Literature search enabled"
    } else {
        "Literature search disabled"
    };
    let depth = if filters.deep_research_enabled {
        "Comprehensive analysis with systematic review approach"
    } else {
        "Standard review"
    };
    let reasoning = if filters.reason_enabled {
        "Enhanced clinical reasoning enabled"
    } else {
        "Standard reasoning"
    };
    let date_range = filters.date_range.map_or("All dates", |r| r.describe());
    let study_type = filters
        .study_type_filter()
        .map_or("All study types", |t| t.label());
    let region = filters.region().unwrap_or("Global");
    let status = filters
        .publication_status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "all")
        .unwrap_or("Any");
    let preprints = match filters.include_preprints {
        Some(false) => "Excluded",
        Some(true) => "Included",
        None => "Included (default)",
    };

    prompt.push_str("SEARCH PARAMETERS:\n");
    let _ = writeln!(prompt, "- Search mode: {search_mode}");
    let _ = writeln!(prompt, "- Analysis depth: {depth}");
    let _ = writeln!(prompt, "- Reasoning: {reasoning}");
    let _ = writeln!(prompt, "- Date range: {date_range}");
    let _ = writeln!(prompt, "- Study type: {study_type}");
    let _ = writeln!(prompt, "- Region: {region}");
    let _ = writeln!(prompt, "- Publication status: {status}");
    let _ = writeln!(prompt, "- Minimum quality score: {}", filters.min_quality_score);
    let _ = writeln!(prompt, "- Preprints: {preprints}");
    prompt.push('\n');
}

fn push_evidence(prompt: &mut String, evidence: &[EvidenceRecord], region: Option<&str>) {
    if evidence.is_empty() {
        let _ = writeln!(prompt, "EVIDENCE:\n{NO_EVIDENCE}\n");
        return;
    }

    let _ = writeln!(prompt, "EVIDENCE ({} sources):", evidence.len());
    for (i, record) in evidence.iter().enumerate() {
        let _ = writeln!(prompt, "[{}] {}", i + 1, record.title);
        let _ = writeln!(prompt, "    Authors: {}", format_authors(&record.authors));
        let _ = writeln!(prompt, "    Journal: {} ({})", record.journal, record.year);
        let _ = writeln!(prompt, "    Study type: {}", record.study_type);
        let abstract_text = if record.has_abstract() {
            truncate_chars(&record.abstract_text, ABSTRACT_EXCERPT_CHARS)
        } else {
            MISSING_ABSTRACT.to_owned()
        };
        let _ = writeln!(prompt, "    Abstract: {abstract_text}");
        let _ = writeln!(prompt, "    Identifiers: {}", format_identifiers(record));
        if let Some(region) = region {
            let _ = writeln!(
                prompt,
                "    Regional relevance: assess applicability to {region}"
            );
        }
        prompt.push('\n');
    }
}

fn format_authors(authors: &[String]) -> String {
    match authors.len() {
        0 => "Not listed".to_owned(),
        n if n <= MAX_LISTED_AUTHORS => authors.join(", "),
        _ => format!("{} et al.", authors[..MAX_LISTED_AUTHORS].join(", ")),
    }
}

fn format_identifiers(record: &EvidenceRecord) -> String {
    let mut ids = Vec::with_capacity(2);
    if let Some(doi) = &record.doi {
        ids.push(format!("DOI {doi}"));
    }
    if let Some(pmid) = &record.pmid {
        ids.push(format!("PMID {pmid}"));
    }
    if ids.is_empty() {
        record.url.clone()
    } else {
        ids.join("; ")
    }
}
