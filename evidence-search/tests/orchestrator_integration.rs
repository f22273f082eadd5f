//! Integration tests for the evidence aggregation pipeline.
//!
//! These tests exercise the full fan-out → concat → dedup → rank → truncate
//! pipeline through the public [`Aggregator`] API using scripted adapters
//! (no network calls).

use std::sync::Arc;

use async_trait::async_trait;
use evidence_search::orchestrator::merge_and_rank;
use evidence_search::orchestrator::ranking::composite_score;
use evidence_search::{
    Aggregator, EvidenceRecord, EvidenceSource, QueryFilters, SearchConfig, SearchError,
    SourceAdapter, StudyType,
};

fn make_record(
    title: &str,
    doi: Option<&str>,
    relevance: f64,
    year: i32,
    source: EvidenceSource,
) -> EvidenceRecord {
    EvidenceRecord {
        title: title.to_string(),
        authors: vec!["Author A".into()],
        journal: "Journal".into(),
        year,
        doi: doi.map(str::to_string),
        pmid: None,
        url: format!("https://example.org/{}", title.replace(' ', "-")),
        abstract_text: format!("Abstract for {title}"),
        study_type: StudyType::ResearchArticle,
        relevance_score: relevance,
        source,
    }
}

struct Fixed {
    source: EvidenceSource,
    records: Result<Vec<EvidenceRecord>, String>,
}

#[async_trait]
impl SourceAdapter for Fixed {
    async fn fetch(
        &self,
        _query: &str,
        _filters: &QueryFilters,
    ) -> Result<Vec<EvidenceRecord>, SearchError> {
        self.records.clone().map_err(SearchError::Http)
    }

    fn source(&self) -> EvidenceSource {
        self.source
    }
}

struct Exploding;

#[async_trait]
impl SourceAdapter for Exploding {
    async fn fetch(
        &self,
        _query: &str,
        _filters: &QueryFilters,
    ) -> Result<Vec<EvidenceRecord>, SearchError> {
        panic!("adapter exploded");
    }

    fn source(&self) -> EvidenceSource {
        EvidenceSource::HealthWeb
    }
}

fn ok(source: EvidenceSource, records: Vec<EvidenceRecord>) -> Arc<dyn SourceAdapter> {
    Arc::new(Fixed {
        source,
        records: Ok(records),
    })
}

fn failing(source: EvidenceSource) -> Arc<dyn SourceAdapter> {
    Arc::new(Fixed {
        source,
        records: Err(format!("{source} unavailable")),
    })
}

/// Five records per backend with two cross-backend duplicates.
fn overlapping_backends() -> Vec<Arc<dyn SourceAdapter>> {
    let pubmed: Vec<EvidenceRecord> = (0..5)
        .map(|i| {
            make_record(
                &format!("PubMed study {i}"),
                Some(&format!("10.1000/pm{i}")),
                0.2,
                2020,
                EvidenceSource::PubMed,
            )
        })
        .collect();

    // The last Europe PMC record has no DOI, so it is keyed by title.
    let mut epmc: Vec<EvidenceRecord> = (0..4)
        .map(|i| {
            let doi = format!("10.1000/ep{i}");
            make_record(
                &format!("Europe PMC study {i}"),
                (i < 3).then_some(doi.as_str()),
                0.2,
                2021,
                EvidenceSource::EuropePmc,
            )
        })
        .collect();
    // Same DOI as a PubMed record.
    epmc.push(make_record(
        "Same paper, Europe PMC title",
        Some("10.1000/pm0"),
        0.9,
        2021,
        EvidenceSource::EuropePmc,
    ));

    let mut openalex: Vec<EvidenceRecord> = (0..4)
        .map(|i| {
            make_record(
                &format!("OpenAlex work {i}"),
                None,
                0.1,
                2022,
                EvidenceSource::OpenAlex,
            )
        })
        .collect();
    // Same title as the DOI-less Europe PMC record.
    openalex.push(make_record(
        "Europe PMC study 3",
        None,
        0.1,
        2022,
        EvidenceSource::OpenAlex,
    ));

    vec![
        ok(EvidenceSource::PubMed, pubmed),
        ok(EvidenceSource::EuropePmc, epmc),
        ok(EvidenceSource::OpenAlex, openalex),
    ]
}

#[tokio::test]
async fn five_five_five_with_two_duplicates_yields_thirteen() {
    let aggregator = Aggregator::new(overlapping_backends(), &SearchConfig::default());
    let records = aggregator.aggregate("study", &QueryFilters::default()).await;
    assert_eq!(records.len(), 13);
}

#[tokio::test]
async fn two_shared_dois_across_backends_yield_thirteen() {
    fn backend(prefix: &str, source: EvidenceSource, dois: [&str; 5]) -> Arc<dyn SourceAdapter> {
        let records = dois
            .iter()
            .enumerate()
            .map(|(i, doi)| make_record(&format!("{prefix} {i}"), Some(*doi), 0.3, 2021, source))
            .collect();
        ok(source, records)
    }

    let adapters = vec![
        backend(
            "PubMed paper",
            EvidenceSource::PubMed,
            ["10.1/a", "10.1/b", "10.1/c", "10.1/d", "10.1/e"],
        ),
        backend(
            "Europe PMC paper",
            EvidenceSource::EuropePmc,
            ["10.1/a", "10.1/f", "10.1/g", "10.1/h", "10.1/i"],
        ),
        backend(
            "OpenAlex paper",
            EvidenceSource::OpenAlex,
            ["10.1/b", "10.1/j", "10.1/k", "10.1/l", "10.1/m"],
        ),
    ];

    let aggregator = Aggregator::new(adapters, &SearchConfig::default());
    let records = aggregator.aggregate("paper", &QueryFilters::default()).await;

    assert_eq!(records.len(), 13);
    for doi in ["10.1/a", "10.1/b"] {
        let kept: Vec<&EvidenceRecord> = records
            .iter()
            .filter(|r| r.doi.as_deref() == Some(doi))
            .collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source, EvidenceSource::PubMed);
    }
}

#[tokio::test]
async fn duplicate_keeps_the_first_seen_record() {
    let aggregator = Aggregator::new(overlapping_backends(), &SearchConfig::default());
    let records = aggregator.aggregate("study", &QueryFilters::default()).await;

    let shared: Vec<&EvidenceRecord> = records
        .iter()
        .filter(|r| r.doi.as_deref() == Some("10.1000/pm0"))
        .collect();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].source, EvidenceSource::PubMed);
    assert_eq!(shared[0].title, "PubMed study 0");
}

#[tokio::test]
async fn results_are_sorted_by_composite_score() {
    let aggregator = Aggregator::new(overlapping_backends(), &SearchConfig::default());
    let records = aggregator.aggregate("study", &QueryFilters::default()).await;
    for pair in records.windows(2) {
        assert!(composite_score(&pair[0]) >= composite_score(&pair[1]));
    }
}

#[tokio::test]
async fn results_truncated_to_max_results() {
    let many: Vec<EvidenceRecord> = (0..30)
        .map(|i| {
            make_record(
                &format!("Distinct record number {i}"),
                None,
                0.1,
                2020,
                EvidenceSource::PubMed,
            )
        })
        .collect();
    let config = SearchConfig {
        max_results: 20,
        ..Default::default()
    };
    let aggregator = Aggregator::new(vec![ok(EvidenceSource::PubMed, many)], &config);
    let records = aggregator.aggregate("record", &QueryFilters::default()).await;
    assert_eq!(records.len(), 20);
}

#[tokio::test]
async fn all_but_one_adapter_failing_returns_the_survivor() {
    let survivor = vec![
        make_record("Survivor one", None, 0.3, 2023, EvidenceSource::OpenAlex),
        make_record("Survivor two", None, 0.2, 2023, EvidenceSource::OpenAlex),
    ];
    let adapters = vec![
        failing(EvidenceSource::PubMed),
        failing(EvidenceSource::EuropePmc),
        ok(EvidenceSource::OpenAlex, survivor),
        Arc::new(Exploding) as Arc<dyn SourceAdapter>,
    ];
    let aggregator = Aggregator::new(adapters, &SearchConfig::default());
    let records = aggregator.aggregate("survivor", &QueryFilters::default()).await;
    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Survivor one", "Survivor two"]);
}

#[tokio::test]
async fn every_adapter_failing_yields_empty_list() {
    let adapters = vec![
        failing(EvidenceSource::PubMed),
        failing(EvidenceSource::EuropePmc),
        failing(EvidenceSource::OpenAlex),
        Arc::new(Exploding) as Arc<dyn SourceAdapter>,
    ];
    let aggregator = Aggregator::new(adapters, &SearchConfig::default());
    assert!(aggregator
        .aggregate("anything", &QueryFilters::default())
        .await
        .is_empty());
}

#[tokio::test]
async fn aggregation_is_idempotent() {
    let aggregator = Aggregator::new(overlapping_backends(), &SearchConfig::default());
    let filters = QueryFilters::default();
    let first = aggregator.aggregate("study", &filters).await;
    let second = aggregator.aggregate("study", &filters).await;
    assert_eq!(first, second);
}

#[test]
fn merge_and_rank_matches_aggregate_order_rules() {
    let contributions = vec![
        vec![make_record("Tie A", None, 0.1, 2020, EvidenceSource::PubMed)],
        vec![make_record("Tie B", None, 0.1, 2020, EvidenceSource::EuropePmc)],
        vec![make_record("Newer", None, 0.1, 2024, EvidenceSource::OpenAlex)],
        vec![make_record("Relevant", None, 0.5, 2001, EvidenceSource::OpenAlex)],
    ];
    let titles: Vec<String> = merge_and_rank(contributions, 20)
        .into_iter()
        .map(|r| r.title)
        .collect();
    assert_eq!(titles, vec!["Relevant", "Newer", "Tie A", "Tie B"]);
}

#[test]
fn merge_and_rank_of_nothing_is_empty() {
    assert!(merge_and_rank(vec![], 20).is_empty());
    assert!(merge_and_rank(vec![vec![], vec![]], 20).is_empty());
}
