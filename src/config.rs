// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{OverlapError, Result};
use crate::models::{EngineKind, MAX_PAGE_RESULTS};
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:27.0) Gecko/20100101 Firefox/27.0";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub http: HttpConfig,
    pub engines: EnginesConfig,
    pub experiment: ExperimentConfig,
    pub dataset: DatasetConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub request_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnginesConfig {
    pub google_scholar: EngineConfig,
    pub semantic_scholar: EngineConfig,
    pub microsoft_academic: EngineConfig,
    pub scopus: ScopusConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    pub enabled: bool,
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScopusConfig {
    pub enabled: bool,
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub subject_area: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExperimentConfig {
    pub max_results: usize,
    pub level: QueryLevel,
    pub match_mode: MatchMode,
    pub fuzzy_threshold: f64,
    pub parallel_workers: usize,
    #[serde(default)]
    pub query_limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasetConfig {
    pub taxonomy_path: PathBuf,
    #[serde(default)]
    pub query_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub pretty: bool,
}

/// Granularity of the taxonomy concepts used as queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryLevel {
    Top,
    Second,
    Third,
    Fourth,
    Leaf,
    All,
}

/// How titles from different engines are judged to be the same paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Exact,
    Normalized,
    Fuzzy,
}

impl FromStr for QueryLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(QueryLevel::Top),
            "second" => Ok(QueryLevel::Second),
            "third" => Ok(QueryLevel::Third),
            "fourth" => Ok(QueryLevel::Fourth),
            "leaf" => Ok(QueryLevel::Leaf),
            "all" => Ok(QueryLevel::All),
            other => Err(format!(
                "unknown level '{}', expected top, second, third, fourth, leaf or all",
                other
            )),
        }
    }
}

impl fmt::Display for QueryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryLevel::Top => "top",
            QueryLevel::Second => "second",
            QueryLevel::Third => "third",
            QueryLevel::Fourth => "fourth",
            QueryLevel::Leaf => "leaf",
            QueryLevel::All => "all",
        };
        f.write_str(name)
    }
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(MatchMode::Exact),
            "normalized" => Ok(MatchMode::Normalized),
            "fuzzy" => Ok(MatchMode::Fuzzy),
            other => Err(format!(
                "unknown match mode '{}', expected exact, normalized or fuzzy",
                other
            )),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchMode::Exact => "exact",
            MatchMode::Normalized => "normalized",
            MatchMode::Fuzzy => "fuzzy",
        };
        f.write_str(name)
    }
}

impl EnginesConfig {
    pub fn is_enabled(&self, kind: EngineKind) -> bool {
        match kind {
            EngineKind::GoogleScholar => self.google_scholar.enabled,
            EngineKind::SemanticScholar => self.semantic_scholar.enabled,
            EngineKind::MicrosoftAcademic => self.microsoft_academic.enabled,
            EngineKind::Scopus => self.scopus.enabled,
        }
    }

    pub fn base_url(&self, kind: EngineKind) -> &str {
        match kind {
            EngineKind::GoogleScholar => &self.google_scholar.base_url,
            EngineKind::SemanticScholar => &self.semantic_scholar.base_url,
            EngineKind::MicrosoftAcademic => &self.microsoft_academic.base_url,
            EngineKind::Scopus => &self.scopus.base_url,
        }
    }

    /// Enabled engines in canonical order.
    pub fn enabled(&self) -> Vec<EngineKind> {
        EngineKind::ALL
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
            .collect()
    }

    pub fn set_enabled(&mut self, kind: EngineKind, enabled: bool) {
        match kind {
            EngineKind::GoogleScholar => self.google_scholar.enabled = enabled,
            EngineKind::SemanticScholar => self.semantic_scholar.enabled = enabled,
            EngineKind::MicrosoftAcademic => self.microsoft_academic.enabled = enabled,
            EngineKind::Scopus => self.scopus.enabled = enabled,
        }
    }
}

impl Config {
    /// Reads settings without validating them; callers decide when
    /// `validate` applies.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("SCHOLAR_OVERLAP")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| OverlapError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| OverlapError::Config(e.to_string()))?;

        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            http: HttpConfig {
                user_agent: DEFAULT_USER_AGENT.to_string(),
                timeout_secs: 30,
                max_retries: 3,
                request_delay_ms: 2000,
            },
            engines: EnginesConfig {
                google_scholar: EngineConfig {
                    enabled: true,
                    base_url: "https://scholar.google.com".to_string(),
                    api_key: None,
                },
                semantic_scholar: EngineConfig {
                    enabled: true,
                    base_url: "https://api.semanticscholar.org".to_string(),
                    api_key: None,
                },
                microsoft_academic: EngineConfig {
                    enabled: false,
                    base_url: "https://academic.microsoft.com/search".to_string(),
                    api_key: None,
                },
                scopus: ScopusConfig {
                    enabled: false,
                    base_url: "https://api.elsevier.com".to_string(),
                    api_key: None,
                    subject_area: Some("COMP".to_string()),
                },
            },
            experiment: ExperimentConfig {
                max_results: MAX_PAGE_RESULTS,
                level: QueryLevel::Leaf,
                match_mode: MatchMode::Exact,
                fuzzy_threshold: 0.9,
                parallel_workers: 1,
                query_limit: None,
            },
            dataset: DatasetConfig {
                taxonomy_path: PathBuf::from("data/acm_ccs2012.xml"),
                query_file: None,
            },
            output: OutputConfig {
                directory: PathBuf::from("./results"),
                pretty: true,
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.experiment.parallel_workers == 0 {
            return Err(OverlapError::Config(
                "parallel_workers must be greater than 0".to_string(),
            ));
        }

        if self.experiment.max_results == 0 || self.experiment.max_results > MAX_PAGE_RESULTS {
            return Err(OverlapError::Config(format!(
                "max_results must be between 1 and {}",
                MAX_PAGE_RESULTS
            )));
        }

        Validator::validate_range(
            "fuzzy_threshold",
            self.experiment.fuzzy_threshold,
            0.0,
            1.0,
        )?;

        let enabled = self.engines.enabled();
        if enabled.len() < 2 {
            return Err(OverlapError::Config(format!(
                "at least two engines must be enabled to measure overlap, found {}",
                enabled.len()
            )));
        }

        for kind in &enabled {
            Validator::validate_url(
                &format!("engines.{}.base_url", kind.config_key()),
                self.engines.base_url(*kind),
            )?;
        }

        if self.engines.scopus.enabled
            && self
                .engines
                .scopus
                .api_key
                .as_deref()
                .is_none_or(|key| key.trim().is_empty())
        {
            return Err(OverlapError::Config(
                "scopus is enabled but engines.scopus.api_key is not set".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.engines.enabled(),
            vec![EngineKind::GoogleScholar, EngineKind::SemanticScholar]
        );
    }

    #[test]
    fn test_requires_two_engines() {
        let mut config = Config::default_config();
        config
            .engines
            .set_enabled(EngineKind::SemanticScholar, false);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scopus_requires_api_key() {
        let mut config = Config::default_config();
        config.engines.set_enabled(EngineKind::Scopus, true);
        assert!(config.validate().is_err());

        config.engines.scopus.api_key = Some("key".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_max_results_bounds() {
        let mut config = Config::default_config();
        config.experiment.max_results = 9;
        assert!(config.validate().is_err());
        config.experiment.max_results = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fuzzy_threshold_bounds() {
        let mut config = Config::default_config();
        config.experiment.fuzzy_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut config = Config::default_config();
        config.engines.google_scholar.base_url = "scholar.google.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_level_and_mode_parsing() {
        assert_eq!("Leaf".parse::<QueryLevel>(), Ok(QueryLevel::Leaf));
        assert!("fifth".parse::<QueryLevel>().is_err());
        assert_eq!("fuzzy".parse::<MatchMode>(), Ok(MatchMode::Fuzzy));
        assert_eq!(MatchMode::Normalized.to_string(), "normalized");
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.toml");
        fs::write(
            &path,
            r#"
[http]
user_agent = "test-agent"
timeout_secs = 5
max_retries = 1
request_delay_ms = 0

[engines.google_scholar]
enabled = true
base_url = "http://localhost:1"

[engines.semantic_scholar]
enabled = true
base_url = "http://localhost:2"

[engines.microsoft_academic]
enabled = false
base_url = "http://localhost:3"

[engines.scopus]
enabled = false
base_url = "http://localhost:4"

[experiment]
max_results = 5
level = "second"
match_mode = "normalized"
fuzzy_threshold = 0.8
parallel_workers = 2

[dataset]
taxonomy_path = "data/ccs.xml"

[output]
directory = "out"
pretty = false
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.http.user_agent, "test-agent");
        assert_eq!(config.experiment.max_results, 5);
        assert_eq!(config.experiment.level, QueryLevel::Second);
        assert_eq!(config.experiment.match_mode, MatchMode::Normalized);
        assert_eq!(config.experiment.query_limit, None);
        assert!(config.dataset.query_file.is_none());
    }

    #[test]
    fn test_load_keeps_config_that_fails_validation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("single.toml");
        fs::write(&path, SINGLE_ENGINE_TOML).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.engines.enabled(), vec![EngineKind::SemanticScholar]);
        assert!(config.validate().is_err());
    }

    pub(crate) const SINGLE_ENGINE_TOML: &str = r#"
[http]
user_agent = "test-agent"
timeout_secs = 5
max_retries = 1
request_delay_ms = 0

[engines.google_scholar]
enabled = false
base_url = "http://localhost:1"

[engines.semantic_scholar]
enabled = true
base_url = "http://localhost:2"

[engines.microsoft_academic]
enabled = false
base_url = "http://localhost:3"

[engines.scopus]
enabled = false
base_url = "http://localhost:4"

[experiment]
max_results = 8
level = "leaf"
match_mode = "exact"
fuzzy_threshold = 0.9
parallel_workers = 1

[dataset]
taxonomy_path = "data/acm_ccs2012.xml"

[output]
directory = "results"
pretty = true
"#;
}
