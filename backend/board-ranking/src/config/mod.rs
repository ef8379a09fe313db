use crate::services::ranking::{Algorithm, FetchOptions};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid RANKING_ALGORITHM: {0:?}")]
    Algorithm(String),

    #[error("Invalid LOG_FORMAT: {0:?} (expected \"text\" or \"json\")")]
    LogFormat(String),

    #[error("{0} must be greater than zero")]
    NonPositive(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub service: ServiceConfig,
    pub ranking: RankingConfig,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub service_name: String,
    pub snapshot_path: PathBuf,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::LogFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RankingConfig {
    pub algorithm: Algorithm,
    pub fetch_concurrency: usize,
    /// Zero disables the deadline
    pub fetch_timeout: Option<Duration>,
    pub top_k: usize,
}

impl RankingConfig {
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            concurrency: self.fetch_concurrency,
            timeout: self.fetch_timeout,
        }
    }
}

/// Raw service-level variables
#[derive(Debug, Deserialize)]
struct ServiceEnv {
    #[serde(default = "default_service_name")]
    service_name: String,
    #[serde(default = "default_snapshot_path")]
    snapshot_path: PathBuf,
    #[serde(default)]
    log_format: String,
}

/// Raw `RANKING_*` variables
#[derive(Debug, Deserialize)]
struct RankingEnv {
    #[serde(default = "default_algorithm")]
    algorithm: String,
    #[serde(default = "default_fetch_concurrency")]
    fetch_concurrency: usize,
    #[serde(default = "default_fetch_timeout_ms")]
    fetch_timeout_ms: u64,
    #[serde(default = "default_top_k")]
    top_k: usize,
}

fn default_service_name() -> String {
    "board-ranking".to_string()
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("snapshot.json")
}

fn default_algorithm() -> String {
    Algorithm::Default.as_str().to_string()
}

fn default_fetch_concurrency() -> usize {
    16
}

fn default_fetch_timeout_ms() -> u64 {
    5_000
}

fn default_top_k() -> usize {
    25
}

impl Config {
    /// Load from `.env` (if present) and the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();

        let service_env: ServiceEnv = envy::from_iter(vars.iter().cloned())?;
        let raw: RankingEnv = envy::prefixed("RANKING_").from_iter(vars)?;

        let algorithm = raw
            .algorithm
            .parse::<Algorithm>()
            .map_err(|_| ConfigError::Algorithm(raw.algorithm.clone()))?;

        if raw.fetch_concurrency == 0 {
            return Err(ConfigError::NonPositive("RANKING_FETCH_CONCURRENCY"));
        }
        if raw.top_k == 0 {
            return Err(ConfigError::NonPositive("RANKING_TOP_K"));
        }

        let fetch_timeout = match raw.fetch_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };

        let service = ServiceConfig {
            log_format: service_env.log_format.parse()?,
            service_name: service_env.service_name,
            snapshot_path: service_env.snapshot_path,
        };

        Ok(Config {
            service,
            ranking: RankingConfig {
                algorithm,
                fetch_concurrency: raw.fetch_concurrency,
                fetch_timeout,
                top_k: raw.top_k,
            },
        })
    }
}
