//! Response synthesis: prompt, model call, JSON extraction, fallback.
//!
//! [`Synthesizer::synthesize`] never fails. A failed model call and an
//! unparsable reply each produce their own fallback answer (see
//! [`fallback`]), and every answer carries the top [`MAX_SOURCES`] records.

pub mod extract;
pub mod fallback;

use std::sync::Arc;

use chrono::Utc;
use evidence_search::{EvidenceRecord, QueryFilters};

use crate::llm::LanguageModel;
use crate::prompt::{SYSTEM_PROMPT, build_prompt};
use crate::types::{AnswerOrigin, ClinicalAnswer};

use extract::parse_model_answer;
use fallback::FallbackContent;

/// Maximum evidence records attached to an answer.
pub const MAX_SOURCES: usize = 8;

/// Turns ranked evidence into a [`ClinicalAnswer`] using a language model.
#[derive(Clone)]
pub struct Synthesizer {
    model: Arc<dyn LanguageModel>,
}

impl Synthesizer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Synthesize an answer from ranked `evidence`.
    ///
    /// 1. Build the prompt and call the model; an error selects the
    ///    model-unavailable fallback
    /// 2. Parse the greedy `{`…`}` span of the reply; failure selects the
    ///    unparsable-output fallback
    /// 3. Attach the top [`MAX_SOURCES`] records and the current time
    pub async fn synthesize(
        &self,
        query: &str,
        patient_context: Option<&str>,
        evidence: &[EvidenceRecord],
        filters: &QueryFilters,
    ) -> ClinicalAnswer {
        let prompt = build_prompt(query, patient_context, evidence, filters);
        tracing::trace!(prompt_chars = prompt.len(), "synthesis prompt built");

        let reply = match self.model.generate(SYSTEM_PROMPT, &prompt).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(
                    model = self.model.model_name(),
                    error = %err,
                    "model unavailable, using templated answer"
                );
                return with_sources(fallback::model_unavailable(query, evidence), evidence);
            }
        };

        match parse_model_answer(&reply) {
            Some(parsed) => ClinicalAnswer {
                summary: parsed.summary,
                key_findings: parsed.key_findings,
                clinical_recommendations: parsed.clinical_recommendations,
                sources: top_sources(evidence),
                citations: parsed.citations,
                follow_up_suggestions: parsed.follow_up_suggestions,
                confidence: parsed.confidence,
                evidence_quality: parsed.evidence_quality,
                last_updated: Utc::now(),
                origin: AnswerOrigin::Model,
            },
            None => {
                tracing::warn!(
                    model = self.model.model_name(),
                    reply_chars = reply.len(),
                    "model reply had no parsable JSON object, using raw text"
                );
                with_sources(fallback::unparsable_output(&reply, evidence), evidence)
            }
        }
    }
}

fn top_sources(evidence: &[EvidenceRecord]) -> Vec<EvidenceRecord> {
    evidence.iter().take(MAX_SOURCES).cloned().collect()
}

fn with_sources(content: FallbackContent, evidence: &[EvidenceRecord]) -> ClinicalAnswer {
    ClinicalAnswer {
        summary: content.summary,
        key_findings: content.key_findings,
        clinical_recommendations: content.clinical_recommendations,
        sources: top_sources(evidence),
        citations: content.citations,
        follow_up_suggestions: content.follow_up_suggestions,
        confidence: content.confidence,
        evidence_quality: content.evidence_quality,
        last_updated: Utc::now(),
        origin: content.origin,
    }
}
