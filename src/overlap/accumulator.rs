// file: src/overlap/accumulator.rs
// description: running per-combination overlap totals across a query set
// reference: internal aggregation

use crate::overlap::jaccard::QueryOverlap;
use crate::overlap::stats::BoxStats;
use crate::overlap::Combination;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationSummary {
    pub combination: Combination,
    pub count: usize,
    pub sum: f64,
    pub average: Option<f64>,
    pub stats: Option<BoxStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapSummary {
    pub complete_queries: usize,
    pub incomplete_queries: usize,
    pub combinations: Vec<CombinationSummary>,
}

impl OverlapSummary {
    pub fn get(&self, combination: &Combination) -> Option<&CombinationSummary> {
        self.combinations
            .iter()
            .find(|c| &c.combination == combination)
    }
}

struct Tally {
    combination: Combination,
    values: Vec<f64>,
}

/// Collects scores from complete queries only; incomplete ones are counted
/// and otherwise ignored.
pub struct OverlapAccumulator {
    tallies: Vec<Tally>,
    complete: usize,
    incomplete: usize,
}

impl OverlapAccumulator {
    pub fn new(combinations: Vec<Combination>) -> Self {
        Self {
            tallies: combinations
                .into_iter()
                .map(|combination| Tally {
                    combination,
                    values: Vec::new(),
                })
                .collect(),
            complete: 0,
            incomplete: 0,
        }
    }

    /// Returns true when the query contributed to the totals.
    pub fn add(&mut self, overlap: &QueryOverlap) -> bool {
        if !overlap.complete {
            self.incomplete += 1;
            return false;
        }

        self.complete += 1;
        for tally in &mut self.tallies {
            if let Some(score) = overlap.score(&tally.combination) {
                tally.values.push(score);
            }
        }
        true
    }

    pub fn complete_queries(&self) -> usize {
        self.complete
    }

    pub fn incomplete_queries(&self) -> usize {
        self.incomplete
    }

    pub fn average(&self, combination: &Combination) -> Option<f64> {
        self.tallies
            .iter()
            .find(|t| &t.combination == combination)
            .and_then(|t| mean(&t.values))
    }

    pub fn summary(&self) -> OverlapSummary {
        OverlapSummary {
            complete_queries: self.complete,
            incomplete_queries: self.incomplete,
            combinations: self
                .tallies
                .iter()
                .map(|t| CombinationSummary {
                    combination: t.combination.clone(),
                    count: t.values.len(),
                    sum: t.values.iter().sum(),
                    average: mean(&t.values),
                    stats: BoxStats::from_values(&t.values),
                })
                .collect(),
        }
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, EngineKind, EngineResults};
    use crate::overlap::combinations;
    use crate::parser::TitleMatcher;

    fn results(engine: EngineKind, titles: &[&str]) -> EngineResults {
        EngineResults::from_articles(
            engine,
            "q",
            titles.iter().map(|t| Article::new(*t)).collect(),
        )
    }

    fn overlap(gs: &[&str], ss: &[&str]) -> QueryOverlap {
        QueryOverlap::compute(
            "q",
            &[
                results(EngineKind::GoogleScholar, gs),
                results(EngineKind::SemanticScholar, ss),
            ],
            8,
            &TitleMatcher::exact(),
        )
    }

    #[test]
    fn test_average_over_complete_queries() {
        let pair: Combination = "GS+SS".parse().unwrap();
        let mut acc = OverlapAccumulator::new(vec![pair.clone()]);

        assert!(acc.add(&overlap(&["a", "b"], &["a", "b"])));
        assert!(acc.add(&overlap(&["a", "b"], &["c", "d"])));

        assert_eq!(acc.complete_queries(), 2);
        assert_eq!(acc.average(&pair), Some(0.5));
    }

    #[test]
    fn test_incomplete_queries_do_not_change_averages() {
        let pair: Combination = "GS+SS".parse().unwrap();
        let mut acc = OverlapAccumulator::new(vec![pair.clone()]);
        acc.add(&overlap(&["a", "b"], &["a", "c"]));
        let before = acc.summary();

        assert!(!acc.add(&overlap(&["a"], &[])));
        let after = acc.summary();

        assert_eq!(acc.incomplete_queries(), 1);
        assert_eq!(before.combinations, after.combinations);
        assert_eq!(after.complete_queries, 1);
    }

    #[test]
    fn test_empty_accumulator_has_no_averages() {
        let combos = combinations(&EngineKind::ALL);
        let acc = OverlapAccumulator::new(combos.clone());
        let summary = acc.summary();

        assert_eq!(summary.combinations.len(), 11);
        assert!(summary.combinations.iter().all(|c| c.average.is_none()));
        assert!(summary.combinations.iter().all(|c| c.stats.is_none()));
        assert_eq!(acc.average(&combos[0]), None);
    }
}
