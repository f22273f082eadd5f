//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls backend endpoints, timeouts, result limits and
//! caching. It deserialises from the `[search]` table of the application
//! config file, with every field optional.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SearchError;

/// Configuration for evidence aggregation.
///
/// Use [`Default::default()`] for production endpoints, or override the
/// base URLs to point adapters at a mirror or a mock server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of records kept after deduplication and ranking.
    pub max_results: usize,
    /// Timeout for each HTTP request in seconds.
    pub timeout_seconds: u64,
    /// Overall budget for one adapter call in seconds, covering every
    /// request it makes (PubMed makes two). Must be at least
    /// `timeout_seconds`.
    pub adapter_timeout_seconds: u64,
    /// How long to cache aggregated results in seconds. 0 disables caching.
    pub cache_ttl_seconds: u64,
    /// Contact address sent in the client identification header.
    pub contact_email: String,
    /// NCBI E-utilities base URL.
    pub pubmed_base_url: String,
    /// Europe PMC REST base URL.
    pub europe_pmc_base_url: String,
    /// OpenAlex API base URL.
    pub openalex_base_url: String,
    /// Whether the placeholder credible-health-web source contributes a record.
    pub health_web_enabled: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 20,
            timeout_seconds: 10,
            adapter_timeout_seconds: 25,
            cache_ttl_seconds: 0,
            contact_email: "evidence@clinsynth.local".to_owned(),
            pubmed_base_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_owned(),
            europe_pmc_base_url: "https://www.ebi.ac.uk/europepmc/webservices/rest".to_owned(),
            openalex_base_url: "https://api.openalex.org".to_owned(),
            health_web_enabled: true,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_results` must be greater than 0
    /// - `timeout_seconds` must be greater than 0
    /// - `adapter_timeout_seconds` must be at least `timeout_seconds`
    /// - every backend base URL must be an absolute http(s) URL
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_results == 0 {
            return Err(SearchError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.adapter_timeout_seconds < self.timeout_seconds {
            return Err(SearchError::Config(
                "adapter_timeout_seconds must be at least timeout_seconds".into(),
            ));
        }
        for (name, value) in [
            ("pubmed_base_url", &self.pubmed_base_url),
            ("europe_pmc_base_url", &self.europe_pmc_base_url),
            ("openalex_base_url", &self.openalex_base_url),
        ] {
            let parsed = Url::parse(value)
                .map_err(|e| SearchError::Config(format!("{name} is not a valid URL: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(SearchError::Config(format!(
                    "{name} must use http or https"
                )));
            }
        }
        Ok(())
    }

    /// The `User-Agent` value identifying this client to backends.
    pub fn user_agent(&self) -> String {
        let version = env!("CARGO_PKG_VERSION");
        if self.contact_email.trim().is_empty() {
            format!("clinsynth/{version}")
        } else {
            format!("clinsynth/{version} (mailto:{})", self.contact_email.trim())
        }
    }
}
