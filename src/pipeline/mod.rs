// file: src/pipeline/mod.rs
// description: experiment execution and progress reporting
// reference: pipeline orchestration

mod progress;
mod runner;

pub use progress::{ExperimentStats, ProgressTracker};
pub use runner::{ExperimentOutcome, ExperimentRunner, QueryRecord, reanalyze};
