//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use quotalink_core::ConfigError;
use quotalink_core::config::EngineConfig;
use quotalink_infra::store::DEFAULT_SHARDS;

/// Document read when no rate source is configured.
const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Where the rate configuration comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum RateSource {
    /// Compact collection list, e.g. `foo=100:1m,bar=1000:30s`.
    Collections(String),
    /// Structured YAML/JSON document on disk.
    Document(PathBuf),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Shards per context key store.
    pub shards: usize,
    pub rates: RateSource,
    /// Overrides the sweep interval from the rate source.
    pub sweep_interval: Option<Duration>,
}

/// Startup failures - the process exits instead of serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to read rate configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// `QUOTALINK_COLLECTIONS` wins over `QUOTALINK_CONFIG` when both are set.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let rates = match var("QUOTALINK_COLLECTIONS") {
            Some(spec) => RateSource::Collections(spec),
            None => RateSource::Document(PathBuf::from(
                var("QUOTALINK_CONFIG").unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string()),
            )),
        };

        Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: var("PORT").and_then(|p| p.parse().ok()).unwrap_or(8080),
            shards: var("QUOTALINK_SHARDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SHARDS),
            rates,
            sweep_interval: var("QUOTALINK_SWEEP_SECONDS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs),
        }
    }

    /// Read and parse the configured rate source.
    pub fn load_engine_config(&self) -> Result<EngineConfig, StartupError> {
        let config = match &self.rates {
            RateSource::Collections(spec) => spec.parse::<EngineConfig>()?,
            RateSource::Document(path) => {
                let contents =
                    std::fs::read_to_string(path).map_err(|source| StartupError::Read {
                        path: path.clone(),
                        source,
                    })?;
                EngineConfig::from_document(&contents)?
            }
        };

        Ok(match self.sweep_interval {
            Some(interval) => config.with_sweep_interval(interval),
            None => config,
        })
    }
}
