// file: src/exporter/csv.rs
// description: csv tables of per-query scores and per-combination summaries
// reference: https://docs.rs/csv

use crate::error::{OverlapError, Result};
use crate::overlap::{Combination, OverlapSummary};
use crate::pipeline::QueryRecord;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

const SUMMARY_HEADER: [&str; 10] = [
    "combination",
    "count",
    "average",
    "std_dev",
    "min",
    "q1",
    "median",
    "q3",
    "max",
    "iqr",
];

#[derive(Debug, Clone)]
pub struct CsvExporter {
    output_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|source| OverlapError::FileOperation {
            path: output_dir.clone(),
            source,
        })?;
        Ok(Self { output_dir })
    }

    /// One row per complete query, one score column per combination.
    /// This is the box-plot input.
    pub fn write_overlap(
        &self,
        run_id: &Uuid,
        combinations: &[Combination],
        records: &[QueryRecord],
    ) -> Result<PathBuf> {
        let path = self.output_dir.join(format!("overlap-{}.csv", run_id));
        let mut writer = csv::Writer::from_path(&path)?;

        let mut header = vec!["query_id".to_string(), "query".to_string()];
        header.extend(combinations.iter().map(Combination::label));
        writer.write_record(&header)?;

        let mut rows = 0;
        for record in records.iter().filter(|r| r.overlap.complete) {
            let mut row = vec![record.id.clone(), record.query.clone()];
            row.extend(
                combinations
                    .iter()
                    .map(|c| format_score(record.overlap.score(c))),
            );
            writer.write_record(&row)?;
            rows += 1;
        }
        writer.flush()?;

        info!("Wrote {} overlap rows to {}", rows, path.display());
        Ok(path)
    }

    pub fn write_summary(&self, run_id: &Uuid, summary: &OverlapSummary) -> Result<PathBuf> {
        let path = self.output_dir.join(format!("summary-{}.csv", run_id));
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(SUMMARY_HEADER)?;

        for row in &summary.combinations {
            let stats = row.stats.as_ref();
            writer.write_record([
                row.combination.label(),
                row.count.to_string(),
                format_score(row.average),
                format_score(stats.map(|s| s.std_dev)),
                format_score(stats.map(|s| s.min)),
                format_score(stats.map(|s| s.q1)),
                format_score(stats.map(|s| s.median)),
                format_score(stats.map(|s| s.q3)),
                format_score(stats.map(|s| s.max)),
                format_score(stats.map(|s| s.iqr())),
            ])?;
        }
        writer.flush()?;

        info!("Wrote summary to {}", path.display());
        Ok(path)
    }
}

fn format_score(value: Option<f64>) -> String {
    value.map(|v| format!("{:.6}", v)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::json::tests::sample_report;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_overlap_csv_has_one_column_per_combination() {
        let dir = tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path()).unwrap();
        let report = sample_report();
        let combos: Vec<Combination> = report
            .summary
            .combinations
            .iter()
            .map(|c| c.combination.clone())
            .collect();

        let path = exporter
            .write_overlap(&report.run_id, &combos, &report.records)
            .unwrap();
        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "query_id,query,GS+SS");
        assert_eq!(lines[1], "abc,robotics,0.500000");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_incomplete_queries_are_left_out() {
        let dir = tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path()).unwrap();
        let mut report = sample_report();
        report.records[0].overlap.complete = false;

        let combos = vec!["GS+SS".parse().unwrap()];
        let path = exporter
            .write_overlap(&report.run_id, &combos, &report.records)
            .unwrap();
        assert_eq!(fs::read_to_string(path).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_summary_csv() {
        let dir = tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path()).unwrap();
        let report = sample_report();

        let path = exporter.write_summary(&report.run_id, &report.summary).unwrap();
        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

        assert_eq!(headers.len(), SUMMARY_HEADER.len());
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "GS+SS");
        assert_eq!(&rows[0][1], "1");
        assert_eq!(&rows[0][2], "0.500000");
        assert_eq!(&rows[0][6], "0.500000");
    }
}
