// file: src/pipeline/runner.rs
// description: runs every query against every engine and aggregates the overlap
// reference: bounded concurrency over queries, engines dispatched concurrently per query

use crate::config::ExperimentConfig;
use crate::dataset::query_id;
use crate::engines::{SearchEngine, search_timed};
use crate::error::{OverlapError, Result};
use crate::models::{EngineKind, EngineResults, ResultStatus, SearchQuery};
use crate::overlap::{OverlapAccumulator, OverlapSummary, QueryOverlap, combinations};
use crate::parser::TitleMatcher;
use crate::pipeline::progress::{ExperimentStats, ProgressTracker};
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything recorded about one query: raw engine output plus its overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub id: String,
    pub query: String,
    pub results: Vec<EngineResults>,
    pub overlap: QueryOverlap,
}

#[derive(Debug, Clone)]
pub struct ExperimentOutcome {
    pub records: Vec<QueryRecord>,
    pub summary: OverlapSummary,
    pub stats: ExperimentStats,
}

pub struct ExperimentRunner {
    engines: Vec<Arc<dyn SearchEngine>>,
    matcher: TitleMatcher,
    max_results: usize,
    parallel_workers: usize,
    show_progress: bool,
    colored: bool,
}

impl ExperimentRunner {
    pub fn new(engines: Vec<Arc<dyn SearchEngine>>, experiment: &ExperimentConfig) -> Self {
        Self {
            engines,
            matcher: TitleMatcher::new(experiment.match_mode, experiment.fuzzy_threshold),
            max_results: experiment.max_results,
            parallel_workers: experiment.parallel_workers.max(1),
            show_progress: false,
            colored: true,
        }
    }

    pub fn with_progress(mut self, colored: bool) -> Self {
        self.show_progress = true;
        self.colored = colored;
        self
    }

    pub fn engine_kinds(&self) -> Vec<EngineKind> {
        self.engines.iter().map(|e| e.kind()).collect()
    }

    pub async fn run(&self, queries: &[String]) -> Result<ExperimentOutcome> {
        if queries.is_empty() {
            return Err(OverlapError::Dataset("no queries to run".to_string()));
        }
        if self.engines.len() < 2 {
            return Err(OverlapError::Validation(format!(
                "overlap needs at least two engines, {} configured",
                self.engines.len()
            )));
        }

        info!(
            "Running {} queries against {} engines with {} concurrent queries",
            queries.len(),
            self.engines.len(),
            self.parallel_workers
        );

        let progress = if self.show_progress {
            ProgressTracker::with_color(queries.len(), self.colored)
        } else {
            ProgressTracker::hidden()
        };

        let mut indexed: Vec<(usize, QueryRecord)> = stream::iter(queries.iter().enumerate())
            .map(|(index, query)| {
                let progress = &progress;
                async move { (index, self.run_query(query, progress).await) }
            })
            .buffer_unordered(self.parallel_workers)
            .collect()
            .await;
        indexed.sort_by_key(|(index, _)| *index);

        let mut accumulator = OverlapAccumulator::new(combinations(&self.engine_kinds()));
        let records: Vec<QueryRecord> = indexed
            .into_iter()
            .map(|(_, record)| {
                accumulator.add(&record.overlap);
                record
            })
            .collect();

        let stats = progress.get_stats();
        progress.finish();

        log_final_stats(&stats);

        Ok(ExperimentOutcome {
            records,
            summary: accumulator.summary(),
            stats,
        })
    }

    async fn run_query(&self, text: &str, progress: &ProgressTracker) -> QueryRecord {
        progress.set_message(text.to_string());
        let query = SearchQuery::keywords(text).with_num_results(self.max_results);

        let results: Vec<EngineResults> =
            join_all(self.engines.iter().map(|engine| search_timed(engine.as_ref(), &query))).await;

        for result in &results {
            progress.record_engine_call(matches!(result.status, ResultStatus::Failed(_)));
            debug!(
                engine = %result.engine,
                query = %text,
                status = ?result.status,
                "Titles: {:?}",
                result.top_titles(self.max_results)
            );
        }

        let overlap = QueryOverlap::compute(text, &results, self.max_results, &self.matcher);
        if overlap.complete {
            progress.inc_completed();
        } else {
            let missing: Vec<&str> = results
                .iter()
                .filter(|r| !r.is_usable())
                .map(|r| r.engine.code())
                .collect();
            warn!(query = %text, "Incomplete query, no usable results from {}", missing.join(", "));
            progress.inc_incomplete();
        }

        QueryRecord {
            id: query_id(text),
            query: text.to_string(),
            results,
            overlap,
        }
    }
}

/// Recomputes overlap for saved records, e.g. under another match mode.
pub fn reanalyze(
    records: &[QueryRecord],
    engines: &[EngineKind],
    max_results: usize,
    matcher: &TitleMatcher,
) -> (Vec<QueryRecord>, OverlapSummary) {
    let mut accumulator = OverlapAccumulator::new(combinations(engines));

    let updated = records
        .iter()
        .map(|record| {
            let results: Vec<EngineResults> = record
                .results
                .iter()
                .filter(|r| engines.contains(&r.engine))
                .cloned()
                .collect();
            let overlap = QueryOverlap::compute(&record.query, &results, max_results, matcher);
            accumulator.add(&overlap);
            QueryRecord {
                id: record.id.clone(),
                query: record.query.clone(),
                results,
                overlap,
            }
        })
        .collect();

    (updated, accumulator.summary())
}

fn log_final_stats(stats: &ExperimentStats) {
    info!("=== Experiment Summary ===");
    info!("Duration: {} seconds", stats.duration_secs);
    info!("Complete queries: {}", stats.queries_completed);
    info!("Incomplete queries: {}", stats.queries_incomplete);
    info!(
        "Engine calls: {} ({} failed)",
        stats.engine_calls, stats.engine_failures
    );
    info!("Completion rate: {:.1}%", stats.completion_rate());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, MatchMode};
    use crate::models::Article;
    use crate::overlap::Combination;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Answers from a fixed table; unknown queries fail.
    struct TableEngine {
        kind: EngineKind,
        table: HashMap<&'static str, Vec<&'static str>>,
    }

    #[async_trait]
    impl SearchEngine for TableEngine {
        fn kind(&self) -> EngineKind {
            self.kind
        }

        async fn search(&self, query: &SearchQuery) -> Result<EngineResults> {
            let text = query.text();
            let titles = self
                .table
                .get(text.as_str())
                .ok_or_else(|| OverlapError::http(self.kind.display_name(), "not found"))?;
            Ok(EngineResults::from_articles(
                self.kind,
                &text,
                titles.iter().map(|t| Article::new(*t)).collect(),
            ))
        }
    }

    fn engines() -> Vec<Arc<dyn SearchEngine>> {
        vec![
            Arc::new(TableEngine {
                kind: EngineKind::GoogleScholar,
                table: HashMap::from([
                    ("robotics", vec!["A", "B"]),
                    ("ontologies", vec!["C", "D"]),
                    ("compilers", vec!["E"]),
                ]),
            }),
            Arc::new(TableEngine {
                kind: EngineKind::SemanticScholar,
                table: HashMap::from([("robotics", vec!["A", "B"]), ("ontologies", vec!["C", "X"])]),
            }),
        ]
    }

    fn experiment(workers: usize) -> ExperimentConfig {
        let mut config = Config::default_config().experiment;
        config.parallel_workers = workers;
        config.match_mode = MatchMode::Exact;
        config
    }

    fn queries() -> Vec<String> {
        ["robotics", "compilers", "ontologies"]
            .iter()
            .map(|q| q.to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_run_aggregates_complete_queries_only() {
        let runner = ExperimentRunner::new(engines(), &experiment(1));
        let outcome = runner.run(&queries()).await.unwrap();

        let pair: Combination = "GS+SS".parse().unwrap();
        let row = outcome.summary.get(&pair).unwrap();

        assert_eq!(outcome.summary.complete_queries, 2);
        assert_eq!(outcome.summary.incomplete_queries, 1);
        assert_eq!(row.count, 2);
        assert!((row.average.unwrap() - (1.0 + 1.0 / 3.0) / 2.0).abs() < 1e-9);
        assert_eq!(outcome.stats.engine_failures, 1);
        assert_eq!(outcome.stats.engine_calls, 6);
    }

    #[tokio::test]
    async fn test_records_keep_input_order() {
        let runner = ExperimentRunner::new(engines(), &experiment(3));
        let outcome = runner.run(&queries()).await.unwrap();

        let order: Vec<&str> = outcome.records.iter().map(|r| r.query.as_str()).collect();
        assert_eq!(order, vec!["robotics", "compilers", "ontologies"]);
        assert!(!outcome.records[1].overlap.complete);
        assert_eq!(outcome.records[0].id, query_id("robotics"));
    }

    #[tokio::test]
    async fn test_run_rejects_empty_dataset() {
        let runner = ExperimentRunner::new(engines(), &experiment(1));
        assert!(runner.run(&[]).await.is_err());
    }

    #[tokio::test]
    async fn test_reanalyze_with_same_settings_reproduces_records() {
        let config = experiment(2);
        let runner = ExperimentRunner::new(engines(), &config);
        let outcome = runner.run(&queries()).await.unwrap();

        let (records, summary) = reanalyze(
            &outcome.records,
            &runner.engine_kinds(),
            config.max_results,
            &TitleMatcher::exact(),
        );

        assert_eq!(records, outcome.records);
        assert_eq!(summary.complete_queries, outcome.summary.complete_queries);
    }

    #[tokio::test]
    async fn test_reanalyze_with_smaller_cutoff() {
        let runner = ExperimentRunner::new(engines(), &experiment(1));
        let outcome = runner.run(&queries()).await.unwrap();

        let (records, summary) = reanalyze(
            &outcome.records,
            &runner.engine_kinds(),
            1,
            &TitleMatcher::exact(),
        );

        let pair: Combination = "GS+SS".parse().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(summary.complete_queries, 2);
        // robotics: {A} vs {A}, ontologies: {C} vs {C}
        assert_eq!(summary.get(&pair).unwrap().average, Some(1.0));
    }
}
