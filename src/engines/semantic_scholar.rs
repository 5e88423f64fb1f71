// file: src/engines/semantic_scholar.rs
// description: Semantic Scholar paper search via the Graph API
// reference: https://api.semanticscholar.org/api-docs/graph

use crate::engines::SearchEngine;
use crate::engines::http::{HttpClient, build_url, endpoint};
use crate::error::Result;
use crate::models::{Article, EngineKind, EngineResults, SearchQuery};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

const FIELDS: &str = "title,url,year,citationCount,externalIds";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    data: Option<Vec<Paper>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Paper {
    paper_id: Option<String>,
    title: Option<String>,
    url: Option<String>,
    year: Option<i32>,
    citation_count: Option<u32>,
    external_ids: Option<ExternalIds>,
}

#[derive(Debug, Deserialize)]
struct ExternalIds {
    #[serde(rename = "DOI")]
    doi: Option<String>,
}

pub struct SemanticScholar {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl SemanticScholar {
    pub fn new(http: HttpClient, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn query_url(&self, query: &SearchQuery) -> Result<Url> {
        query.validate()?;

        let mut params = vec![
            ("query", query.text()),
            ("limit", query.num_results.to_string()),
            ("fields", FIELDS.to_string()),
        ];

        match (query.year_start, query.year_end) {
            (None, None) => {}
            (start, end) => params.push((
                "year",
                format!(
                    "{}-{}",
                    start.map(|y| y.to_string()).unwrap_or_default(),
                    end.map(|y| y.to_string()).unwrap_or_default()
                ),
            )),
        }

        build_url(
            EngineKind::SemanticScholar,
            &endpoint(&self.base_url, "graph/v1/paper/search"),
            &params,
        )
    }

    /// Interprets a search response body.
    pub fn parse_response(query: &str, body: serde_json::Value) -> EngineResults {
        let kind = EngineKind::SemanticScholar;
        let response: SearchResponse = match serde_json::from_value(body) {
            Ok(response) => response,
            Err(e) => return EngineResults::malformed(kind, query, e.to_string()),
        };

        let Some(papers) = response.data else {
            return if response.total.unwrap_or(0) == 0 {
                EngineResults::from_articles(kind, query, Vec::new()).with_total(Some(0))
            } else {
                EngineResults::malformed(kind, query, "response has a total but no data")
            };
        };

        let mut articles = Vec::with_capacity(papers.len());
        for paper in papers {
            let Some(title) = paper.title.filter(|t| !t.trim().is_empty()) else {
                return EngineResults::malformed(
                    kind,
                    query,
                    format!(
                        "paper {} has no title",
                        paper.paper_id.as_deref().unwrap_or("<unknown>")
                    ),
                );
            };

            let mut article = Article::new(title).with_year(paper.year);
            article.url = paper.url;
            article.num_citations = paper.citation_count.unwrap_or(0);
            article.doi = paper.external_ids.and_then(|ids| ids.doi);
            articles.push(article);
        }

        EngineResults::from_articles(kind, query, articles).with_total(response.total)
    }
}

#[async_trait]
impl SearchEngine for SemanticScholar {
    fn kind(&self) -> EngineKind {
        EngineKind::SemanticScholar
    }

    async fn search(&self, query: &SearchQuery) -> Result<EngineResults> {
        let url = self.query_url(query)?;
        let headers: Vec<(&str, String)> = self
            .api_key
            .iter()
            .map(|key| ("x-api-key", key.clone()))
            .collect();

        let body = self
            .http
            .get_json(EngineKind::SemanticScholar, url, &headers)
            .await?;

        let results = Self::parse_response(&query.text(), body);
        debug!("Parsed {} Semantic Scholar results", results.articles.len());
        Ok(results)
    }
}
