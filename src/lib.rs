//! Clinsynth: clinical evidence aggregation and synthesis.
//!
//! Answers free-text clinical questions by combining published evidence
//! with a language model:
//! Query → evidence backends → dedup/rank → prompt → model → structured answer
//!
//! # Architecture
//!
//! - **Evidence retrieval**: the [`evidence_search`] crate queries PubMed,
//!   Europe PMC and OpenAlex concurrently and ranks the merged records
//! - **Prompt**: [`prompt::build_prompt`] renders query, context, filters
//!   and evidence into a fixed template
//! - **Synthesis**: [`synthesize::Synthesizer`] calls a [`llm::LanguageModel`]
//!   and parses its JSON answer, with two deterministic fallback tiers
//! - **Service**: [`server`] exposes the pipeline over HTTP with `axum`

pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod server;
pub mod synthesize;
pub mod types;

pub use config::AppConfig;
pub use error::{ClinicalError, Result};
pub use pipeline::ClinicalPipeline;
pub use server::ClinicalServer;
pub use synthesize::Synthesizer;
pub use types::{AnswerOrigin, ClinicalAnswer, ClinicalRequest};
