// file: src/models/query.rs
// description: search query parameters shared by every engine adapter
// reference: advanced search options exposed by academic search engines

use crate::error::{OverlapError, Result};
use crate::utils::Validator;
use serde::{Deserialize, Serialize};

/// Per-page result ceiling enforced for every engine.
pub const MAX_PAGE_RESULTS: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Words that must all be found in the result.
    pub words: Option<String>,
    /// Words of which at least one must be found.
    pub words_some: Option<String>,
    /// Words of which none may be found.
    pub words_none: Option<String>,
    /// Exact phrase.
    pub phrase: Option<String>,
    pub title_only: bool,
    pub author: Option<String>,
    pub publication: Option<String>,
    pub year_start: Option<i32>,
    pub year_end: Option<i32>,
    pub include_patents: bool,
    pub include_citations: bool,
    pub num_results: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            words: None,
            words_some: None,
            words_none: None,
            phrase: None,
            title_only: false,
            author: None,
            publication: None,
            year_start: None,
            year_end: None,
            include_patents: true,
            include_citations: true,
            num_results: MAX_PAGE_RESULTS,
        }
    }
}

impl SearchQuery {
    /// Plain keyword query, the form used for dataset experiments.
    pub fn keywords(text: impl Into<String>) -> Self {
        Self {
            words: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_num_results(mut self, num: usize) -> Self {
        self.num_results = num.clamp(1, MAX_PAGE_RESULTS);
        self
    }

    pub fn set_timeframe(&mut self, start: Option<&str>, end: Option<&str>) -> Result<()> {
        self.year_start = start.map(Validator::validate_year).transpose()?;
        self.year_end = end.map(Validator::validate_year).transpose()?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let has_terms = [
            &self.words,
            &self.words_some,
            &self.words_none,
            &self.phrase,
            &self.author,
            &self.publication,
        ]
        .iter()
        .any(|value| value.as_deref().is_some_and(|v| !v.trim().is_empty()));

        if !has_terms && self.year_start.is_none() && self.year_end.is_none() {
            return Err(OverlapError::QueryArgument(
                "search query needs more parameters".to_string(),
            ));
        }
        Ok(())
    }

    /// Free-text form for engines without advanced-search fields.
    pub fn text(&self) -> String {
        let mut parts = Vec::new();

        if let Some(words) = self.words.as_deref() {
            parts.push(words.trim().to_string());
        }
        if let Some(phrase) = self.phrase.as_deref() {
            parts.push(format!("\"{}\"", phrase.trim()));
        }
        if let Some(some) = self.words_some.as_deref() {
            parts.push(parenthesize_phrases(some));
        }

        parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Turns `some words, foo, bar` into `"some words" foo bar`.
pub fn parenthesize_phrases(query: &str) -> String {
    if !query.contains(',') {
        return query.to_string();
    }

    query
        .split(',')
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .map(|phrase| {
            if phrase.contains(' ') {
                format!("\"{}\"", phrase)
            } else {
                phrase.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parenthesize_phrases() {
        assert_eq!(
            parenthesize_phrases("some words, foo, bar"),
            "\"some words\" foo bar"
        );
        assert_eq!(parenthesize_phrases("foo bar baz"), "foo bar baz");
    }

    #[test]
    fn test_empty_query_is_rejected() {
        let query = SearchQuery::default();
        assert!(matches!(
            query.validate(),
            Err(OverlapError::QueryArgument(_))
        ));

        assert!(SearchQuery::keywords("neural networks").validate().is_ok());

        let mut dated = SearchQuery::default();
        dated.year_start = Some(1970);
        assert!(dated.validate().is_ok());
    }

    #[test]
    fn test_timeframe_parsing() {
        let mut query = SearchQuery::default();
        query.set_timeframe(Some("1970"), None).unwrap();
        assert_eq!(query.year_start, Some(1970));
        assert_eq!(query.year_end, None);

        assert!(query.set_timeframe(Some("nineteen"), None).is_err());
    }

    #[test]
    fn test_num_results_is_capped() {
        let query = SearchQuery::keywords("x").with_num_results(50);
        assert_eq!(query.num_results, MAX_PAGE_RESULTS);
        let query = SearchQuery::keywords("x").with_num_results(0);
        assert_eq!(query.num_results, 1);
    }

    #[test]
    fn test_text_combines_terms() {
        let mut query = SearchQuery::keywords("quantum");
        query.phrase = Some("field theory".to_string());
        assert_eq!(query.text(), "quantum \"field theory\"");
    }
}
