// file: src/exporter/json.rs
// description: json run reports, written after a run and read back for re-analysis

use crate::config::{Config, MatchMode};
use crate::error::{OverlapError, Result};
use crate::models::EngineKind;
use crate::overlap::OverlapSummary;
use crate::pipeline::{ExperimentOutcome, ExperimentStats, QueryRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Settings that shaped a run's numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    pub engines: Vec<EngineKind>,
    pub dataset: String,
    pub max_results: usize,
    pub match_mode: MatchMode,
    pub fuzzy_threshold: f64,
}

impl RunSettings {
    pub fn from_config(config: &Config, dataset: &str) -> Self {
        Self {
            engines: config.engines.enabled(),
            dataset: dataset.to_string(),
            max_results: config.experiment.max_results,
            match_mode: config.experiment.match_mode,
            fuzzy_threshold: config.experiment.fuzzy_threshold,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub settings: RunSettings,
    pub records: Vec<QueryRecord>,
    pub summary: OverlapSummary,
    pub stats: ExperimentStats,
}

impl RunReport {
    pub fn new(
        run_id: Uuid,
        started_at: DateTime<Utc>,
        settings: RunSettings,
        outcome: ExperimentOutcome,
    ) -> Self {
        Self {
            run_id,
            started_at,
            finished_at: Utc::now(),
            settings,
            records: outcome.records,
            summary: outcome.summary,
            stats: outcome.stats,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsonExporter {
    output_dir: PathBuf,
    pretty: bool,
}

impl JsonExporter {
    pub fn new(output_dir: impl Into<PathBuf>, pretty: bool) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|source| OverlapError::FileOperation {
            path: output_dir.clone(),
            source,
        })?;
        Ok(Self { output_dir, pretty })
    }

    pub fn report_path(&self, run_id: &Uuid) -> PathBuf {
        self.output_dir.join(format!("report-{}.json", run_id))
    }

    pub fn write(&self, report: &RunReport) -> Result<PathBuf> {
        let path = self.report_path(&report.run_id);
        let body = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };

        fs::write(&path, body).map_err(|source| OverlapError::FileOperation {
            path: path.clone(),
            source,
        })?;

        info!(
            "Wrote report for {} queries to {}",
            report.records.len(),
            path.display()
        );
        Ok(path)
    }

    pub fn read(path: &Path) -> Result<RunReport> {
        let body = fs::read_to_string(path).map_err(|source| OverlapError::FileOperation {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{Article, EngineResults};
    use crate::overlap::{OverlapAccumulator, QueryOverlap, combinations};
    use crate::parser::TitleMatcher;
    use tempfile::tempdir;

    pub(crate) fn sample_report() -> RunReport {
        let engines = vec![EngineKind::GoogleScholar, EngineKind::SemanticScholar];
        let results = vec![
            EngineResults::from_articles(
                EngineKind::GoogleScholar,
                "robotics",
                vec![Article::new("A"), Article::new("B")],
            ),
            EngineResults::from_articles(
                EngineKind::SemanticScholar,
                "robotics",
                vec![
                    Article::new("A"),
                    Article::new("B"),
                    Article::new("C"),
                    Article::new("D"),
                ],
            ),
        ];
        let overlap = QueryOverlap::compute("robotics", &results, 8, &TitleMatcher::exact());
        let mut accumulator = OverlapAccumulator::new(combinations(&engines));
        accumulator.add(&overlap);

        let outcome = ExperimentOutcome {
            records: vec![QueryRecord {
                id: "abc".to_string(),
                query: "robotics".to_string(),
                results,
                overlap,
            }],
            summary: accumulator.summary(),
            stats: ExperimentStats::default(),
        };

        RunReport::new(
            Uuid::new_v4(),
            Utc::now(),
            RunSettings::from_config(&Config::default_config(), "taxonomy:leaf"),
            outcome,
        )
    }

    #[test]
    fn test_exporter_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("results").join("run");
        assert!(JsonExporter::new(&nested, true).is_ok());
        assert!(nested.is_dir());
    }

    #[test]
    fn test_report_written_and_read_back() {
        let dir = tempdir().unwrap();
        let exporter = JsonExporter::new(dir.path(), false).unwrap();
        let report = sample_report();

        let path = exporter.write(&report).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            format!("report-{}.json", report.run_id)
        );

        let loaded = JsonExporter::read(&path).unwrap();
        assert_eq!(loaded.run_id, report.run_id);
        assert_eq!(loaded.records, report.records);
        assert_eq!(loaded.summary, report.summary);
        assert_eq!(loaded.settings.match_mode, MatchMode::Exact);
    }

    #[test]
    fn test_read_missing_report() {
        let err = JsonExporter::read(Path::new("/nonexistent/report.json")).unwrap_err();
        assert!(matches!(err, OverlapError::FileOperation { .. }));
    }
}
