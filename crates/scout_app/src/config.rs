use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use scout_core::{ReconcileSettings, SearchFilters};
use scout_engine::{HttpSettings, ServiceSettings, TrackerSettings, DEFAULT_WIDTH};
use serde::{Deserialize, Serialize};

use crate::logging::LogDestination;

pub const DEFAULT_CONFIG_PATH: &str = "./scout.ron";

/// Name under which the library export is registered as a source.
pub const LIBRARY_SOURCE: &str = "library";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("batch #{index} names unknown provider {provider:?}")]
    UnknownProvider { index: usize, provider: String },
}

/// Contents of `scout.ron`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_destination: LogDestination,
    pub log_level: String,
    /// Concurrent lookups per batch.
    pub width: usize,
    pub retention_secs: u64,
    pub cleanup_period_secs: u64,
    pub poll_interval_ms: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// JSON export of the personal library.
    pub library_path: PathBuf,
    pub subsets: Vec<SubsetConfig>,
    pub providers: Vec<ProviderConfig>,
    pub filters: SearchFilters,
    pub reconcile: ReconcileSettings,
    pub batches: Vec<BatchConfig>,
}

/// Named selection of library titles, usable as a batch source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsetConfig {
    pub name: String,
    pub titles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub token: Option<TokenConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub url: String,
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_source")]
    pub source: String,
    pub provider: String,
}

fn default_source() -> String {
    LIBRARY_SOURCE.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        let tracker = TrackerSettings::default();
        let http = HttpSettings::default();
        Self {
            log_destination: LogDestination::default(),
            log_level: "info".to_string(),
            width: DEFAULT_WIDTH,
            retention_secs: tracker.retention.as_secs(),
            cleanup_period_secs: tracker.cleanup_period.as_secs(),
            poll_interval_ms: 200,
            connect_timeout_secs: http.connect_timeout.as_secs(),
            request_timeout_secs: http.request_timeout.as_secs(),
            library_path: PathBuf::from("./library.json"),
            subsets: Vec::new(),
            providers: Vec::new(),
            filters: SearchFilters::default(),
            reconcile: ReconcileSettings::default(),
            batches: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Reads and validates `path`. `None` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: Self = ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(Some(config))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (index, batch) in self.batches.iter().enumerate() {
            if !self.providers.iter().any(|p| p.name == batch.provider) {
                return Err(ConfigError::UnknownProvider {
                    index,
                    provider: batch.provider.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn tracker_settings(&self) -> TrackerSettings {
        TrackerSettings {
            retention: Duration::from_secs(self.retention_secs),
            cleanup_period: Duration::from_secs(self.cleanup_period_secs.max(1)),
        }
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..HttpSettings::default()
        }
    }

    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            width: self.width,
            reconcile: self.reconcile,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}
