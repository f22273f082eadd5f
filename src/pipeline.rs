//! End-to-end clinical query pipeline.
//!
//! Validate → aggregate evidence → synthesize. Owns one [`Aggregator`]
//! (and with it the shared HTTP client and result cache) and one
//! [`Synthesizer`] for the life of the process.

use std::sync::Arc;

use evidence_search::Aggregator;

use crate::config::AppConfig;
use crate::error::Result;
use crate::llm::{LanguageModel, OpenAiChatModel};
use crate::synthesize::Synthesizer;
use crate::types::{ClinicalAnswer, ClinicalRequest};

/// Runs clinical queries against evidence backends and a language model.
pub struct ClinicalPipeline {
    aggregator: Aggregator,
    synthesizer: Synthesizer,
}

impl ClinicalPipeline {
    pub fn new(aggregator: Aggregator, synthesizer: Synthesizer) -> Self {
        Self {
            aggregator,
            synthesizer,
        }
    }

    /// Build the production pipeline from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the search or model configuration is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let aggregator = Aggregator::from_config(&config.search)?;
        let model: Arc<dyn LanguageModel> = Arc::new(OpenAiChatModel::new(&config.llm)?);
        Ok(Self::new(aggregator, Synthesizer::new(model)))
    }

    /// Answer one clinical query.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ClinicalError::InvalidRequest`] for a blank
    /// query, before any backend is contacted. Every later failure is
    /// absorbed into a degraded answer.
    pub async fn run(&self, request: &ClinicalRequest) -> Result<ClinicalAnswer> {
        let query = request.validated_query()?;
        let patient_context = request.patient_context();
        tracing::trace!(query, patient_context, "clinical query received");

        let evidence = self.aggregator.aggregate(query, &request.filters).await;
        tracing::info!(evidence = evidence.len(), "evidence aggregated");

        let answer = self
            .synthesizer
            .synthesize(query, patient_context, &evidence, &request.filters)
            .await;
        tracing::info!(
            origin = ?answer.origin,
            confidence = answer.confidence,
            sources = answer.sources.len(),
            "answer synthesized"
        );
        Ok(answer)
    }
}
