//! Language model backends for evidence synthesis.
//!
//! The synthesizer talks to a model through the [`LanguageModel`] trait so
//! tests can substitute scripted models. The production backend is
//! [`OpenAiChatModel`], which speaks the OpenAI chat completions API
//! (OpenAI itself, or a compatible server such as Ollama, vLLM or llama.cpp).

pub mod api;

pub use api::OpenAiChatModel;

use async_trait::async_trait;

use crate::error::Result;

/// A text-generation backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate one complete reply for a system and a user message.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ClinicalError::Model`] if the backend cannot
    /// be reached or returns no usable text.
    async fn generate(&self, system: &str, prompt: &str) -> Result<String>;

    /// Model identifier used in logs.
    fn model_name(&self) -> &str;
}
