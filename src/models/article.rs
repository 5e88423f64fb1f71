// file: src/models/article.rs
// description: a single search result as parsed from an engine response
// reference: internal data structures

use serde::{Deserialize, Serialize};

/// One ranked result returned by a search engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub num_citations: u32,
    #[serde(default)]
    pub num_versions: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_pdf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_citations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_versions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_citation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation_data: Option<String>,
}

/// Attribute keys and labels in display order.
const FIELDS: [(&str, &str); 11] = [
    ("title", "Title"),
    ("url", "URL"),
    ("year", "Year"),
    ("num_citations", "Citations"),
    ("num_versions", "Versions"),
    ("cluster_id", "Cluster ID"),
    ("url_pdf", "PDF link"),
    ("url_citations", "Citations list"),
    ("url_versions", "Versions list"),
    ("url_citation", "Citation link"),
    ("excerpt", "Excerpt"),
];

impl Article {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into().trim().to_string(),
            ..Self::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    pub fn set_citation_data(&mut self, data: String) {
        self.citation_data = Some(data);
    }

    fn field_value(&self, key: &str) -> Option<String> {
        match key {
            "title" => Some(self.title.clone()),
            "url" => self.url.clone(),
            "year" => self.year.map(|y| y.to_string()),
            "num_citations" => Some(self.num_citations.to_string()),
            "num_versions" => Some(self.num_versions.to_string()),
            "cluster_id" => self.cluster_id.clone(),
            "url_pdf" => self.url_pdf.clone(),
            "url_citations" => self.url_citations.clone(),
            "url_versions" => self.url_versions.clone(),
            "url_citation" => self.url_citation.clone(),
            "excerpt" => self.excerpt.clone(),
            _ => None,
        }
    }

    /// Label-aligned text block, skipping unset attributes.
    pub fn as_txt(&self) -> String {
        let width = FIELDS
            .iter()
            .map(|(_, label)| label.len())
            .max()
            .unwrap_or(0);

        FIELDS
            .iter()
            .filter_map(|(key, label)| {
                self.field_value(key)
                    .map(|value| format!("{:>width$} {}", label, value, width = width))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn csv_header(sep: char) -> String {
        FIELDS
            .iter()
            .map(|(key, _)| *key)
            .collect::<Vec<_>>()
            .join(&sep.to_string())
    }

    pub fn as_csv(&self, header: bool, sep: char) -> String {
        let row = FIELDS
            .iter()
            .map(|(key, _)| self.field_value(key).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(&sep.to_string());

        if header {
            format!("{}\n{}", Self::csv_header(sep), row)
        } else {
            row
        }
    }

    pub fn as_citation(&self) -> &str {
        self.citation_data.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_trims_title() {
        let article = Article::new("  Honeycomb: creating intrusion detection signatures \n");
        assert_eq!(
            article.title,
            "Honeycomb: creating intrusion detection signatures"
        );
    }

    #[test]
    fn test_as_txt_skips_unset_fields() {
        let article = Article::new("Deep learning")
            .with_url("https://example.org/paper")
            .with_year(Some(2015));

        let txt = article.as_txt();
        assert!(txt.contains("         Title Deep learning"));
        assert!(txt.contains("          Year 2015"));
        assert!(txt.contains("     Citations 0"));
        assert!(!txt.contains("Cluster ID"));
        assert!(!txt.contains("Excerpt"));
    }

    #[test]
    fn test_as_csv_with_header() {
        let mut article = Article::new("Graph kernels").with_year(Some(2010));
        article.num_citations = 42;

        let csv = article.as_csv(true, '|');
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("title|url|year|num_citations"));
        assert_eq!(lines[1], "Graph kernels||2010|42|0||||||");
    }

    #[test]
    fn test_citation_defaults_to_empty() {
        let mut article = Article::new("Paper");
        assert_eq!(article.as_citation(), "");
        article.set_citation_data("@article{x}".to_string());
        assert_eq!(article.as_citation(), "@article{x}");
    }
}
