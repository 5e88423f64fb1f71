// file: src/engines/scopus.rs
// description: Scopus search via the Elsevier Search API
// reference: https://dev.elsevier.com/documentation/ScopusSearchAPI.wadl

use crate::engines::SearchEngine;
use crate::engines::http::{HttpClient, build_url, endpoint};
use crate::error::Result;
use crate::models::{Article, EngineKind, EngineResults, SearchQuery};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

const FIELDS: &str = "dc:title,prism:doi,prism:coverDate,prism:url";

pub struct Scopus {
    http: HttpClient,
    base_url: String,
    api_key: String,
    subject_area: Option<String>,
}

impl Scopus {
    pub fn new(
        http: HttpClient,
        base_url: &str,
        api_key: String,
        subject_area: Option<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            subject_area: subject_area.filter(|s| !s.trim().is_empty()),
        }
    }

    /// Scopus advanced query string, e.g. `TITLE-ABS-KEY(data mining) AND SUBJAREA(COMP)`.
    pub fn query_expression(&self, query: &SearchQuery) -> String {
        let mut expression = format!("TITLE-ABS-KEY({})", query.text());

        if let Some(author) = query.author.as_deref() {
            expression.push_str(&format!(" AND AUTHOR-NAME({})", author.trim()));
        }
        if let Some(area) = self.subject_area.as_deref() {
            expression.push_str(&format!(" AND SUBJAREA({})", area.trim()));
        }
        expression
    }

    pub fn query_url(&self, query: &SearchQuery) -> Result<Url> {
        query.validate()?;

        let mut params = vec![
            ("query", self.query_expression(query)),
            ("field", FIELDS.to_string()),
            ("count", query.num_results.to_string()),
        ];

        match (query.year_start, query.year_end) {
            (None, None) => {}
            (start, end) => params.push((
                "date",
                format!(
                    "{}-{}",
                    start.map(|y| y.to_string()).unwrap_or_else(|| "1800".to_string()),
                    end.map(|y| y.to_string()).unwrap_or_else(|| "2100".to_string())
                ),
            )),
        }

        build_url(
            EngineKind::Scopus,
            &endpoint(&self.base_url, "content/search/scopus"),
            &params,
        )
    }

    /// Interprets a search response body.
    pub fn parse_response(query: &str, body: &Value) -> EngineResults {
        let kind = EngineKind::Scopus;

        let Some(search_results) = body.get("search-results") else {
            return EngineResults::malformed(kind, query, "missing search-results");
        };
        let Some(entries) = search_results.get("entry").and_then(Value::as_array) else {
            return EngineResults::malformed(kind, query, "missing entry list");
        };

        let total = search_results
            .get("opensearch:totalResults")
            .and_then(|v| match v {
                Value::String(s) => s.parse().ok(),
                other => other.as_u64(),
            });

        if entries.len() == 1 && entries[0].get("error").is_some() {
            return EngineResults::from_articles(kind, query, Vec::new()).with_total(Some(0));
        }

        let mut articles = Vec::with_capacity(entries.len());
        for entry in entries {
            let Some(title) = entry.get("dc:title").and_then(Value::as_str) else {
                return EngineResults::malformed(kind, query, "entry without dc:title");
            };

            let mut article = Article::new(title);
            article.doi = entry
                .get("prism:doi")
                .and_then(Value::as_str)
                .map(str::to_string);
            article.url = entry
                .get("prism:url")
                .and_then(Value::as_str)
                .map(str::to_string);
            article.year = entry
                .get("prism:coverDate")
                .and_then(Value::as_str)
                .and_then(|date| date.get(..4))
                .and_then(|year| year.parse().ok());
            articles.push(article);
        }

        EngineResults::from_articles(kind, query, articles).with_total(total)
    }
}

#[async_trait]
impl SearchEngine for Scopus {
    fn kind(&self) -> EngineKind {
        EngineKind::Scopus
    }

    async fn search(&self, query: &SearchQuery) -> Result<EngineResults> {
        let url = self.query_url(query)?;
        let headers = [
            ("Accept", "application/json".to_string()),
            ("X-ELS-APIKey", self.api_key.clone()),
        ];

        let body = self.http.get_json(EngineKind::Scopus, url, &headers).await?;
        let results = Self::parse_response(&query.text(), &body);
        debug!("Parsed {} Scopus results", results.articles.len());
        Ok(results)
    }
}
