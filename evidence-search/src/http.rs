//! Shared HTTP client for backend requests.
//!
//! One [`reqwest::Client`] is built per aggregator and cloned into each
//! adapter (clones share the connection pool).

use std::time::Duration;

use crate::config::SearchConfig;
use crate::error::SearchError;

/// Build a [`reqwest::Client`] configured for the literature APIs.
///
/// The client has:
/// - Timeout from config
/// - A `User-Agent` identifying the client and its contact address
///   (OpenAlex requires one; the others accept it)
/// - gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent())
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Send a prepared GET request and decode its JSON body.
pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
    backend: &str,
) -> Result<T, SearchError> {
    let response = request
        .send()
        .await
        .map_err(|e| SearchError::Http(format!("{backend} request failed: {e}")))?
        .error_for_status()
        .map_err(|e| SearchError::Http(format!("{backend} HTTP error: {e}")))?;

    let body = response
        .text()
        .await
        .map_err(|e| SearchError::Http(format!("{backend} response read failed: {e}")))?;

    tracing::trace!(backend, bytes = body.len(), "response received");

    serde_json::from_str(&body)
        .map_err(|e| SearchError::Parse(format!("{backend} returned malformed JSON: {e}")))
}
