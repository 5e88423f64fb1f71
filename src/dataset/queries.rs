// file: src/dataset/queries.rs
// description: query dataset assembly from a taxonomy or a plain query file
// reference: internal dataset conventions

use crate::config::{DatasetConfig, QueryLevel};
use crate::dataset::Taxonomy;
use crate::error::{OverlapError, Result};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct QueryDataset {
    pub source: String,
    pub queries: Vec<String>,
}

impl QueryDataset {
    pub fn from_taxonomy(taxonomy: &Taxonomy, level: QueryLevel) -> Self {
        let queries = taxonomy.labels(level);
        info!("Selected {} {} concepts as queries", queries.len(), level);
        Self {
            source: format!("taxonomy:{}", level),
            queries,
        }
    }

    /// One query per line; blank lines and `#` comments are skipped.
    pub fn from_query_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| OverlapError::FileOperation {
            path: path.to_path_buf(),
            source,
        })?;

        let dataset = Self::from_lines(&content, &path.display().to_string());
        if dataset.queries.is_empty() {
            return Err(OverlapError::Dataset(format!(
                "query file {} contains no queries",
                path.display()
            )));
        }

        info!("Loaded {} queries from {}", dataset.queries.len(), path.display());
        Ok(dataset)
    }

    pub fn from_lines(content: &str, source: &str) -> Self {
        let mut seen = HashSet::new();
        let queries = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter(|line| seen.insert(line.to_string()))
            .map(str::to_string)
            .collect();

        Self {
            source: source.to_string(),
            queries,
        }
    }

    /// Loads the query file when configured, the taxonomy otherwise.
    pub fn load(config: &DatasetConfig, level: QueryLevel) -> Result<Self> {
        match &config.query_file {
            Some(path) => Self::from_query_file(path),
            None => {
                let taxonomy = Taxonomy::load(&config.taxonomy_path)?;
                let dataset = Self::from_taxonomy(&taxonomy, level);
                if dataset.queries.is_empty() {
                    return Err(OverlapError::Dataset(format!(
                        "taxonomy {} has no concepts at level {}",
                        config.taxonomy_path.display(),
                        level
                    )));
                }
                Ok(dataset)
            }
        }
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        if let Some(limit) = limit {
            self.queries.truncate(limit);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

/// Stable identifier for a query string, used as the export row key.
pub fn query_id(query: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.trim().to_lowercase().as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..12].to_string()
}
