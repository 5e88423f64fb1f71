// file: src/pipeline/progress.rs
// description: progress bars and run statistics for an experiment
// reference: uses indicatif for progress bars and tracks query and engine counters

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentStats {
    pub queries_completed: usize,
    pub queries_incomplete: usize,
    pub engine_calls: usize,
    pub engine_failures: usize,
    pub duration_secs: u64,
}

impl ExperimentStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_queries(&self) -> usize {
        self.queries_completed + self.queries_incomplete
    }

    pub fn queries_per_minute(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        self.total_queries() as f64 * 60.0 / self.duration_secs as f64
    }

    /// Share of queries every engine answered, in percent.
    pub fn completion_rate(&self) -> f64 {
        let total = self.total_queries();
        if total == 0 {
            return 0.0;
        }
        (self.queries_completed as f64 / total as f64) * 100.0
    }
}

pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    completed: Arc<AtomicUsize>,
    incomplete: Arc<AtomicUsize>,
    engine_calls: Arc<AtomicUsize>,
    engine_failures: Arc<AtomicUsize>,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new(total_queries: usize) -> Self {
        Self::with_color(total_queries, true)
    }

    pub fn with_color(total_queries: usize, colored: bool) -> Self {
        Self::build(MultiProgress::new(), total_queries, colored)
    }

    /// Progress output disabled, for tests and non-interactive use.
    pub fn hidden() -> Self {
        Self::build(
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            0,
            false,
        )
    }

    fn build(multi_progress: MultiProgress, total_queries: usize, colored: bool) -> Self {
        let main_bar = create_progress_bar(&multi_progress, total_queries as u64, colored);
        let detail_bar = create_detail_bar(&multi_progress);

        Self {
            main_bar,
            detail_bar,
            completed: Arc::new(AtomicUsize::new(0)),
            incomplete: Arc::new(AtomicUsize::new(0)),
            engine_calls: Arc::new(AtomicUsize::new(0)),
            engine_failures: Arc::new(AtomicUsize::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_completed(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn inc_incomplete(&self) {
        self.incomplete.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn record_engine_call(&self, failed: bool) {
        self.engine_calls.fetch_add(1, Ordering::SeqCst);
        if failed {
            self.engine_failures.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn set_message(&self, message: String) {
        self.main_bar.set_message(message);
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("Experiment complete");
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> ExperimentStats {
        ExperimentStats {
            queries_completed: self.completed.load(Ordering::SeqCst),
            queries_incomplete: self.incomplete.load(Ordering::SeqCst),
            engine_calls: self.engine_calls.load(Ordering::SeqCst),
            engine_failures: self.engine_failures.load(Ordering::SeqCst),
            duration_secs: self.start_time.elapsed().as_secs(),
        }
    }

    fn update_detail_bar(&self) {
        let incomplete = self.incomplete.load(Ordering::SeqCst);
        let failures = self.engine_failures.load(Ordering::SeqCst);

        self.detail_bar.set_message(format!(
            "Incomplete: {} | Engine failures: {}",
            incomplete, failures
        ));
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    let (template, chars) = if colored {
        (
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            "█▓▒░",
        )
    } else {
        (
            "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({eta}) {msg}",
            "=>-",
        )
    };
    bar.set_style(
        ProgressStyle::default_bar()
            .template(template)
            .expect("progress bar template is valid")
            .progress_chars(chars),
    );
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg}")
            .expect("detail bar template is valid"),
    );
    bar
}
