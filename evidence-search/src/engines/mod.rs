//! Backend adapter implementations.
//!
//! Each module provides a struct implementing [`crate::engine::SourceAdapter`]
//! for one literature backend.

pub mod europe_pmc;
pub mod health_web;
pub mod openalex;
pub mod pubmed;

use std::sync::Arc;

pub use europe_pmc::EuropePmcAdapter;
pub use health_web::HealthWebAdapter;
pub use openalex::OpenAlexAdapter;
pub use pubmed::PubMedAdapter;

use crate::config::SearchConfig;
use crate::engine::SourceAdapter;
use crate::error::SearchError;
use crate::http;

/// Build the production adapters in fan-out order: PubMed, Europe PMC,
/// OpenAlex, then the health-web placeholder when enabled.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the shared HTTP client cannot be built.
pub fn default_adapters(config: &SearchConfig) -> Result<Vec<Arc<dyn SourceAdapter>>, SearchError> {
    let client = http::build_client(config)?;

    let mut adapters: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(PubMedAdapter::new(client.clone(), &config.pubmed_base_url)),
        Arc::new(EuropePmcAdapter::new(
            client.clone(),
            &config.europe_pmc_base_url,
        )),
        Arc::new(OpenAlexAdapter::new(client, &config.openalex_base_url)),
    ];
    if config.health_web_enabled {
        adapters.push(Arc::new(HealthWebAdapter));
    }
    Ok(adapters)
}
