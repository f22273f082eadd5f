//! OpenAI-compatible API backend.
//!
//! Supports any server implementing the OpenAI chat completions API:
//! - OpenAI (`https://api.openai.com`)
//! - Ollama (`http://localhost:11434`)
//! - vLLM, llama.cpp server, etc.
//!
//! Requests are non-streaming: the synthesizer needs the whole reply before
//! it can extract the JSON answer.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::LanguageModel;
use crate::config::LlmConfig;
use crate::error::{ClinicalError, Result};

/// Chat completions client for one configured model.
pub struct OpenAiChatModel {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    max_tokens: usize,
}

impl OpenAiChatModel {
    /// Create a client from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicalError::Config`] if the configuration is invalid or
    /// the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ClinicalError::Config(format!("failed to build model client: {e}")))?;

        tracing::info!(
            api_url = %config.api_url,
            model = %config.api_model,
            "model client configured"
        );

        Ok(Self {
            client,
            base_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.api_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Point the client at a different server, e.g. a mock in tests.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn map_http_error(status: reqwest::StatusCode, body: &str) -> ClinicalError {
        let message = extract_error_message(body);
        match status.as_u16() {
            401 => ClinicalError::Model(format!("authentication failed: {message}")),
            429 => ClinicalError::Model(format!("rate limited: {message}")),
            code => ClinicalError::Model(format!("HTTP {code}: {message}")),
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };

        let mut request = self.client.post(self.endpoint()).json(&body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let started = Instant::now();
        let response = request
            .send()
            .await
            .map_err(|e| ClinicalError::Model(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(Self::map_http_error(status, &body_text));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClinicalError::Model(format!("malformed completion: {e}")))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| ClinicalError::Model("completion has no content".into()))?;

        tracing::debug!(
            model = %self.model,
            chars = content.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "model reply received"
        );
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Extract an error message from an OpenAI error response body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: usize,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}
