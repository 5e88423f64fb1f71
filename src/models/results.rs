// file: src/models/results.rs
// description: result set returned by one engine for one query
// reference: internal data structures

use crate::models::{Article, EngineKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ResultStatus {
    Ok,
    Empty,
    Malformed(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineResults {
    pub engine: EngineKind,
    pub query: String,
    pub articles: Vec<Article>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_results: Option<u64>,
    pub status: ResultStatus,
    pub elapsed_ms: u64,
}

impl EngineResults {
    /// Builds a result set, dropping articles whose title is blank.
    pub fn from_articles(engine: EngineKind, query: &str, articles: Vec<Article>) -> Self {
        let articles: Vec<Article> = articles
            .into_iter()
            .filter(|a| !a.title.trim().is_empty())
            .collect();

        let status = if articles.is_empty() {
            ResultStatus::Empty
        } else {
            ResultStatus::Ok
        };

        Self {
            engine,
            query: query.to_string(),
            articles,
            total_results: None,
            status,
            elapsed_ms: 0,
        }
    }

    pub fn malformed(engine: EngineKind, query: &str, reason: impl Into<String>) -> Self {
        Self::with_status(engine, query, ResultStatus::Malformed(reason.into()))
    }

    pub fn failed(engine: EngineKind, query: &str, reason: impl Into<String>) -> Self {
        Self::with_status(engine, query, ResultStatus::Failed(reason.into()))
    }

    fn with_status(engine: EngineKind, query: &str, status: ResultStatus) -> Self {
        Self {
            engine,
            query: query.to_string(),
            articles: Vec::new(),
            total_results: None,
            status,
            elapsed_ms: 0,
        }
    }

    pub fn with_total(mut self, total: Option<u64>) -> Self {
        self.total_results = total;
        self
    }

    /// True when the set can take part in overlap scoring.
    pub fn is_usable(&self) -> bool {
        self.status == ResultStatus::Ok && !self.articles.is_empty()
    }

    /// Titles in rank order, truncated to `limit`.
    pub fn top_titles(&self, limit: usize) -> Vec<&str> {
        self.articles
            .iter()
            .take(limit)
            .map(|a| a.title.as_str())
            .collect()
    }
}
