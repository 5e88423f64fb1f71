// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod dataset;
pub mod engines;
pub mod error;
pub mod exporter;
pub mod models;
pub mod overlap;
pub mod parser;
pub mod pipeline;
pub mod utils;

pub use config::{Config, MatchMode, QueryLevel};
pub use dataset::{QueryDataset, Taxonomy};
pub use engines::{SearchEngine, build_engine, build_engines};
pub use error::{OverlapError, Result};
pub use exporter::{CsvExporter, JsonExporter, RunReport, RunSettings};
pub use models::{Article, EngineKind, EngineResults, ResultStatus, SearchQuery};
pub use overlap::{BoxStats, Combination, OverlapAccumulator, OverlapSummary, QueryOverlap};
pub use parser::{TitleMatcher, TitleNormalizer};
pub use pipeline::{ExperimentRunner, ExperimentStats, ProgressTracker, QueryRecord};
pub use utils::{HealthReport, OperationTimer, Validator};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let config = Config::default_config();
        let engines = config.engines.enabled();
        assert_eq!(overlap::combinations(&engines).len(), 1);
        assert_eq!(TitleMatcher::default().mode(), MatchMode::Exact);
    }
}
