// file: src/engines/mod.rs
// description: search engine adapters and the trait they share
// reference: internal module structure

pub mod google_scholar;
pub mod http;
pub mod microsoft_academic;
pub mod scopus;
pub mod semantic_scholar;

pub use google_scholar::{CitationFormat, GoogleScholar, ScholarSettings};
pub use http::HttpClient;
pub use microsoft_academic::MicrosoftAcademic;
pub use scopus::Scopus;
pub use semantic_scholar::SemanticScholar;

use crate::config::Config;
use crate::error::{OverlapError, Result};
use crate::models::{EngineKind, EngineResults, SearchQuery};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

#[async_trait]
pub trait SearchEngine: Send + Sync {
    fn kind(&self) -> EngineKind;

    /// Fetches and parses the first results page for `query`.
    async fn search(&self, query: &SearchQuery) -> Result<EngineResults>;
}

/// Runs a search and folds any error into the result status.
pub async fn search_timed(engine: &dyn SearchEngine, query: &SearchQuery) -> EngineResults {
    let start = Instant::now();
    let text = query.text();

    let mut results = match engine.search(query).await {
        Ok(results) => results,
        Err(e) => {
            warn!(engine = %engine.kind(), query = %text, "Search failed: {}", e);
            EngineResults::failed(engine.kind(), &text, e.to_string())
        }
    };

    results.elapsed_ms = start.elapsed().as_millis() as u64;
    results
}

/// Builds the enabled engines in canonical order.
pub fn build_engines(config: &Config) -> Result<Vec<Arc<dyn SearchEngine>>> {
    let engines = config
        .engines
        .enabled()
        .into_iter()
        .map(|kind| build_engine(config, kind))
        .collect::<Result<Vec<_>>>()?;

    info!(
        "Configured engines: {}",
        engines
            .iter()
            .map(|e| e.kind().code())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(engines)
}

/// Builds one engine with its own HTTP session, whether or not it is enabled.
pub fn build_engine(config: &Config, kind: EngineKind) -> Result<Arc<dyn SearchEngine>> {
    let http = HttpClient::new(&config.http)?;
    let engines = &config.engines;

    let engine: Arc<dyn SearchEngine> = match kind {
        EngineKind::GoogleScholar => Arc::new(GoogleScholar::new(
            http,
            &engines.google_scholar.base_url,
        )),
        EngineKind::SemanticScholar => Arc::new(SemanticScholar::new(
            http,
            &engines.semantic_scholar.base_url,
            engines.semantic_scholar.api_key.clone(),
        )),
        EngineKind::MicrosoftAcademic => Arc::new(MicrosoftAcademic::new(
            http,
            &engines.microsoft_academic.base_url,
        )),
        EngineKind::Scopus => {
            let api_key = engines.scopus.api_key.clone().ok_or_else(|| {
                OverlapError::Config("engines.scopus.api_key is not set".to_string())
            })?;
            Arc::new(Scopus::new(
                http,
                &engines.scopus.base_url,
                api_key,
                engines.scopus.subject_area.clone(),
            ))
        }
    };

    Ok(engine)
}
