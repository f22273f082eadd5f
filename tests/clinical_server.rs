//! Integration tests for the clinical query HTTP server.
//!
//! Each test starts a real server on an auto-assigned port with scripted
//! evidence adapters and a scripted model, then talks to it over HTTP.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use clinsynth::config::ServerConfig;
use clinsynth::llm::LanguageModel;
use clinsynth::{ClinicalError, ClinicalPipeline, ClinicalServer, Synthesizer};
use evidence_search::{
    Aggregator, EvidenceRecord, EvidenceSource, QueryFilters, SearchConfig, SearchError,
    SourceAdapter, StudyType,
};
use serde_json::{Value, json};

struct CountingAdapter {
    calls: AtomicUsize,
}

#[async_trait]
impl SourceAdapter for CountingAdapter {
    async fn fetch(
        &self,
        query: &str,
        _filters: &QueryFilters,
    ) -> Result<Vec<EvidenceRecord>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((0..10)
            .map(|i| EvidenceRecord {
                title: format!("{query} trial {i}"),
                authors: vec!["Nguyen T".into()],
                journal: "BMJ".into(),
                year: 2020,
                doi: Some(format!("10.1136/{i}")),
                pmid: None,
                url: format!("https://doi.org/10.1136/{i}"),
                abstract_text: "Outcomes improved.".into(),
                study_type: StudyType::Rct,
                relevance_score: 0.1,
                source: EvidenceSource::EuropePmc,
            })
            .collect())
    }

    fn source(&self) -> EvidenceSource {
        EvidenceSource::EuropePmc
    }
}

enum ModelScript {
    Reply(String),
    Down,
    Panic,
}

struct ScriptedModel(ModelScript);

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, _system: &str, _prompt: &str) -> clinsynth::Result<String> {
        match &self.0 {
            ModelScript::Reply(text) => Ok(text.clone()),
            ModelScript::Down => Err(ClinicalError::Model("connection refused".into())),
            ModelScript::Panic => panic!("model client bug"),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

async fn start(script: ModelScript) -> (ClinicalServer, Arc<CountingAdapter>) {
    let adapter = Arc::new(CountingAdapter {
        calls: AtomicUsize::new(0),
    });
    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![adapter.clone()];
    let pipeline = ClinicalPipeline::new(
        Aggregator::new(adapters, &SearchConfig::default()),
        Synthesizer::new(Arc::new(ScriptedModel(script))),
    );
    let config = ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
    };
    let server = ClinicalServer::start(Arc::new(pipeline), &config)
        .await
        .unwrap();
    (server, adapter)
}

fn url(server: &ClinicalServer, path: &str) -> String {
    format!("http://{}{path}", server.addr())
}

#[tokio::test]
async fn health_reports_ok() {
    let (server, _) = start(ModelScript::Down).await;
    let response = reqwest::get(url(&server, "/health")).await.unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn answers_query_with_camel_case_body() {
    let reply = json!({
        "summary": "Use a thiazide first.",
        "keyFindings": ["SBP fell 10 mmHg"],
        "clinicalRecommendations": ["Start chlorthalidone 12.5 mg"],
        "citations": ["Nguyen T et al. (2020)"],
        "followUpSuggestions": ["When to add an ACE inhibitor?"],
        "confidence": 0.9,
        "evidenceQuality": "High",
        "lastUpdated": "2024-01-01T00:00:00Z"
    })
    .to_string();
    let (server, adapter) = start(ModelScript::Reply(reply)).await;

    let response = reqwest::Client::new()
        .post(url(&server, "/api/clinical-query"))
        .json(&json!({
            "query": "hypertension treatment",
            "patientContext": "58M, type 2 diabetes",
            "filters": { "searchEnabled": true, "dateRange": "last-5-years" }
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["summary"], "Use a thiazide first.");
    assert_eq!(body["keyFindings"], json!(["SBP fell 10 mmHg"]));
    assert_eq!(body["clinicalRecommendations"], json!(["Start chlorthalidone 12.5 mg"]));
    assert_eq!(body["followUpSuggestions"], json!(["When to add an ACE inhibitor?"]));
    assert_eq!(body["confidence"], 0.9);
    assert_eq!(body["evidenceQuality"], "High");
    assert_eq!(body["sources"].as_array().unwrap().len(), 8);
    assert_eq!(body["sources"][0]["source"], "europePmc");
    assert_eq!(body["sources"][0]["studyType"], "RCT");
    assert!(body["sources"][0].get("abstract").is_some());
    assert!(body["lastUpdated"].is_string());
    assert_ne!(body["lastUpdated"], "2024-01-01T00:00:00Z");
    assert!(body.get("origin").is_none());
    assert_eq!(adapter.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_query_is_rejected_without_searching() {
    let (server, adapter) = start(ModelScript::Down).await;
    let client = reqwest::Client::new();

    for body in [json!({ "query": "" }), json!({ "query": "   " }), json!({})] {
        let response = client
            .post(url(&server, "/api/clinical-query"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Query is required" }));
    }
    assert_eq!(adapter.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let (server, adapter) = start(ModelScript::Down).await;
    let response = reqwest::Client::new()
        .post(url(&server, "/api/clinical-query"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    assert_eq!(adapter.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn model_outage_still_returns_an_answer() {
    let (server, _) = start(ModelScript::Down).await;
    let response = reqwest::Client::new()
        .post(url(&server, "/api/clinical-query"))
        .json(&json!({ "query": "hypertension treatment" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["confidence"], 0.7);
    assert!(body["summary"].as_str().unwrap().contains("hypertension treatment"));
    assert_eq!(body["citations"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn panic_in_pipeline_is_a_generic_500() {
    let (server, _) = start(ModelScript::Panic).await;
    let response = reqwest::Client::new()
        .post(url(&server, "/api/clinical-query"))
        .json(&json!({ "query": "hypertension treatment" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Internal server error" }));

    // The server keeps serving after a failed request.
    let health = reqwest::get(url(&server, "/health")).await.unwrap();
    assert_eq!(health.status(), 200);
}
