// file: src/utils/telemetry.rs
// description: setup checks for the check command and phase timing for runs
// reference: health reporting and operation timing

use crate::config::Config;
use crate::dataset::{QueryDataset, Taxonomy};
use crate::models::EngineKind;
use crate::utils::Validator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    fn icon(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "✓",
            HealthStatus::Degraded => "⚠",
            HealthStatus::Unhealthy => "✗",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub component: String,
    pub status: HealthStatus,
    pub message: Option<String>,
}

impl HealthCheck {
    pub fn healthy(component: &str, message: impl Into<String>) -> Self {
        Self::with_status(component, HealthStatus::Healthy, Some(message.into()))
    }

    pub fn degraded(component: &str, message: impl Into<String>) -> Self {
        Self::with_status(component, HealthStatus::Degraded, Some(message.into()))
    }

    pub fn unhealthy(component: &str, message: impl Into<String>) -> Self {
        Self::with_status(component, HealthStatus::Unhealthy, Some(message.into()))
    }

    fn with_status(component: &str, status: HealthStatus, message: Option<String>) -> Self {
        Self {
            component: component.to_string(),
            status,
            message,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall_status: HealthStatus,
    pub checks: Vec<HealthCheck>,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthReport {
    pub fn new(checks: Vec<HealthCheck>, version: impl Into<String>) -> Self {
        let overall_status = checks
            .iter()
            .map(|c| c.status)
            .max()
            .unwrap_or(HealthStatus::Healthy);

        Self {
            overall_status,
            checks,
            timestamp: Utc::now(),
            version: version.into(),
        }
    }

    /// Checks configuration, dataset and engine setup without any network access.
    pub fn for_config(config: &Config, version: &str) -> Self {
        let mut checks = vec![match config.validate() {
            Ok(()) => HealthCheck::healthy("config", "configuration is valid"),
            Err(e) => HealthCheck::unhealthy("config", e.to_string()),
        }];

        checks.push(dataset_check(config));
        checks.extend(EngineKind::ALL.into_iter().map(|kind| engine_check(config, kind)));

        Self::new(checks, version)
    }

    pub fn is_healthy(&self) -> bool {
        self.overall_status != HealthStatus::Unhealthy
    }

    pub fn format(&self) -> String {
        let mut output = format!(
            "{} Setup: {:?}\nVersion: {}\nChecked: {}\n\n",
            self.overall_status.icon(),
            self.overall_status,
            self.version,
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        );

        for check in &self.checks {
            output.push_str(&format!("{} {}", check.status.icon(), check.component));
            if let Some(ref msg) = check.message {
                output.push_str(&format!(": {}", msg));
            }
            output.push('\n');
        }

        output
    }
}

fn dataset_check(config: &Config) -> HealthCheck {
    let level = config.experiment.level;

    if let Some(path) = &config.dataset.query_file {
        return match QueryDataset::from_query_file(path) {
            Ok(dataset) => HealthCheck::healthy(
                "dataset",
                format!("{} queries in {}", dataset.len(), path.display()),
            ),
            Err(e) => HealthCheck::unhealthy("dataset", e.to_string()),
        };
    }

    let path = &config.dataset.taxonomy_path;
    if let Err(e) = Validator::validate_readable_file(path) {
        return HealthCheck::unhealthy("dataset", e.to_string());
    }

    match Taxonomy::load(path) {
        Ok(taxonomy) => {
            let queries = taxonomy.labels(level).len();
            let message = format!(
                "{} concepts, {} queries at level {}",
                taxonomy.len(),
                queries,
                level
            );
            if queries == 0 {
                HealthCheck::unhealthy("dataset", message)
            } else {
                HealthCheck::healthy("dataset", message)
            }
        }
        Err(e) => HealthCheck::unhealthy("dataset", e.to_string()),
    }
}

fn engine_check(config: &Config, kind: EngineKind) -> HealthCheck {
    let component = kind.config_key();
    let base_url = config.engines.base_url(kind);

    if !config.engines.is_enabled(kind) {
        return HealthCheck::degraded(component, "disabled");
    }
    if let Err(e) = Validator::validate_url("base_url", base_url) {
        return HealthCheck::unhealthy(component, e.to_string());
    }

    let keyed = match kind {
        EngineKind::Scopus => config.engines.scopus.api_key.is_some(),
        EngineKind::SemanticScholar => config.engines.semantic_scholar.api_key.is_some(),
        _ => false,
    };
    let suffix = if keyed { " (api key set)" } else { "" };

    HealthCheck::healthy(component, format!("enabled, {}{}", base_url, suffix))
}

/// Logs the duration of a named phase.
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        info!("Starting {}", operation);
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn finish(self) -> Duration {
        let elapsed = self.elapsed();
        info!("Finished {} in {:.2}s", self.operation, elapsed.as_secs_f64());
        elapsed
    }

    pub fn finish_with_count(self, count: usize) -> Duration {
        let elapsed = self.elapsed();
        let secs = elapsed.as_secs_f64();
        info!(
            "Finished {}: {} items in {:.2}s ({:.2} items/sec)",
            self.operation,
            count,
            secs,
            if secs > 0.0 { count as f64 / secs } else { 0.0 }
        );
        elapsed
    }
}
