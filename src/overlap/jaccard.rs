// file: src/overlap/jaccard.rs
// description: jaccard similarity and per-query overlap scoring
// reference: https://en.wikipedia.org/wiki/Jaccard_index

use crate::models::{EngineKind, EngineResults};
use crate::overlap::combinations::{Combination, combinations};
use crate::parser::TitleMatcher;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// |S1 ∩ ... ∩ Sn| / |S1 ∪ ... ∪ Sn|, or None when the union is empty.
pub fn jaccard(sets: &[&BTreeSet<String>]) -> Option<f64> {
    let (first, rest) = sets.split_first()?;

    let mut union: BTreeSet<&String> = first.iter().collect();
    for set in rest {
        union.extend(set.iter());
    }
    if union.is_empty() {
        return None;
    }

    let intersection = first
        .iter()
        .filter(|title| rest.iter().all(|set| set.contains(*title)))
        .count();

    Some(intersection as f64 / union.len() as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationScore {
    pub combination: Combination,
    pub score: Option<f64>,
}

/// Overlap of one query across every engine that answered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOverlap {
    pub query: String,
    /// Matched title keys per engine, after truncation.
    pub title_sets: BTreeMap<EngineKind, BTreeSet<String>>,
    pub scores: Vec<CombinationScore>,
    pub complete: bool,
}

impl QueryOverlap {
    /// Truncates each result list to `max_results` titles, maps titles onto
    /// shared keys with `matcher`, and scores every engine combination.
    ///
    /// Combinations touching an engine without a usable result set get no
    /// score. The query is complete only when every result set is usable.
    pub fn compute(
        query: &str,
        results: &[EngineResults],
        max_results: usize,
        matcher: &TitleMatcher,
    ) -> Self {
        let lists: Vec<Vec<&str>> = results
            .iter()
            .map(|r| {
                if r.is_usable() {
                    r.top_titles(max_results)
                } else {
                    Vec::new()
                }
            })
            .collect();

        let keyed = matcher.key_sets(&lists);

        let mut title_sets = BTreeMap::new();
        let mut usable = BTreeSet::new();
        for (result, set) in results.iter().zip(keyed) {
            if result.is_usable() && !set.is_empty() {
                usable.insert(result.engine);
            }
            title_sets.insert(result.engine, set);
        }

        let engines: Vec<EngineKind> = title_sets.keys().copied().collect();
        let scores = combinations(&engines)
            .into_iter()
            .map(|combination| {
                let score = if combination.engines().iter().all(|e| usable.contains(e)) {
                    let sets: Vec<&BTreeSet<String>> = combination
                        .engines()
                        .iter()
                        .filter_map(|e| title_sets.get(e))
                        .collect();
                    jaccard(&sets)
                } else {
                    None
                };
                CombinationScore { combination, score }
            })
            .collect();

        let complete = !results.is_empty() && results.iter().all(|r| usable.contains(&r.engine));

        Self {
            query: query.to_string(),
            title_sets,
            scores,
            complete,
        }
    }

    pub fn score(&self, combination: &Combination) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| &s.combination == combination)
            .and_then(|s| s.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchMode;
    use crate::models::Article;
    use crate::overlap::OverlapAccumulator;
    use pretty_assertions::assert_eq;

    fn set(titles: &[&str]) -> BTreeSet<String> {
        titles.iter().map(|t| t.to_string()).collect()
    }

    fn results(engine: EngineKind, titles: &[&str]) -> EngineResults {
        EngineResults::from_articles(
            engine,
            "q",
            titles.iter().map(|t| Article::new(*t)).collect(),
        )
    }

    #[test]
    fn test_identical_and_disjoint_sets() {
        let a = set(&["x", "y"]);
        let b = set(&["x", "y"]);
        let c = set(&["z"]);

        assert_eq!(jaccard(&[&a, &b]), Some(1.0));
        assert_eq!(jaccard(&[&a, &c]), Some(0.0));
        assert_eq!(jaccard(&[&a, &b, &c]), Some(0.0));
    }

    #[test]
    fn test_partial_overlap() {
        let a = set(&["a", "b", "c"]);
        let b = set(&["b", "c", "d"]);
        let c = set(&["c", "d", "e"]);

        assert_eq!(jaccard(&[&a, &b]), Some(0.5));
        assert_eq!(jaccard(&[&a, &b, &c]), Some(0.2));
    }

    #[test]
    fn test_empty_union_is_undefined() {
        let empty = BTreeSet::new();
        assert_eq!(jaccard(&[&empty, &empty]), None);
        assert_eq!(jaccard(&[]), None);
    }

    #[test]
    fn test_truncation_happens_before_set_conversion() {
        // Duplicate titles inside the top 8 shrink the set instead of
        // pulling in rank 9.
        let gs = results(
            EngineKind::GoogleScholar,
            &["A", "A", "B", "C", "D", "E", "F", "G", "H"],
        );
        let ss = results(EngineKind::SemanticScholar, &["H"]);

        let overlap = QueryOverlap::compute("q", &[gs, ss], 8, &TitleMatcher::exact());
        assert_eq!(overlap.title_sets[&EngineKind::GoogleScholar].len(), 7);
        assert!(!overlap.title_sets[&EngineKind::GoogleScholar].contains("H"));

        let pair: Combination = "GS+SS".parse().unwrap();
        assert_eq!(overlap.score(&pair), Some(0.0));
        assert!(overlap.complete);
    }

    #[test]
    fn test_failed_engine_marks_query_incomplete() {
        let gs = results(EngineKind::GoogleScholar, &["A", "B"]);
        let ss = results(EngineKind::SemanticScholar, &["A", "B"]);
        let sc = EngineResults::failed(EngineKind::Scopus, "q", "timeout");

        let overlap = QueryOverlap::compute("q", &[gs, ss, sc], 8, &TitleMatcher::exact());
        assert!(!overlap.complete);
        assert_eq!(overlap.scores.len(), 4);
        assert_eq!(overlap.score(&"GS+SS".parse().unwrap()), Some(1.0));
        assert_eq!(overlap.score(&"GS+SC".parse().unwrap()), None);
        assert_eq!(overlap.score(&"GS+SS+SC".parse().unwrap()), None);
    }

    #[test]
    fn test_normalized_matching_changes_scores() {
        let gs = results(EngineKind::GoogleScholar, &["Deep Learning."]);
        let ss = results(EngineKind::SemanticScholar, &["deep learning"]);
        let pair: Combination = "GS+SS".parse().unwrap();

        let exact =
            QueryOverlap::compute("q", &[gs.clone(), ss.clone()], 8, &TitleMatcher::exact());
        assert_eq!(exact.score(&pair), Some(0.0));

        let normalized = QueryOverlap::compute(
            "q",
            &[gs, ss],
            8,
            &TitleMatcher::new(MatchMode::Normalized, 1.0),
        );
        assert_eq!(normalized.score(&pair), Some(1.0));
    }

    #[test]
    fn test_titles_folding_to_nothing_make_query_incomplete() {
        let matcher = TitleMatcher::new(MatchMode::Normalized, 1.0);
        let gs = results(EngineKind::GoogleScholar, &["..."]);
        let ss = results(EngineKind::SemanticScholar, &["\u{2014}"]);
        let sc = results(EngineKind::Scopus, &["A paper"]);

        let overlap = QueryOverlap::compute("q", &[gs, ss, sc], 8, &matcher);
        assert!(!overlap.complete);
        assert!(overlap.scores.iter().all(|s| s.score.is_none()));

        let engines = [
            EngineKind::GoogleScholar,
            EngineKind::SemanticScholar,
            EngineKind::Scopus,
        ];
        let mut accumulator = OverlapAccumulator::new(combinations(&engines));
        assert!(!accumulator.add(&overlap));

        let full: Vec<EngineResults> = engines
            .into_iter()
            .map(|engine| results(engine, &["A paper"]))
            .collect();
        assert!(accumulator.add(&QueryOverlap::compute("q", &full, 8, &matcher)));

        let summary = accumulator.summary();
        assert!(summary.combinations.iter().all(|c| c.count == 1));
        assert_eq!(summary.incomplete_queries, 1);
    }
}
