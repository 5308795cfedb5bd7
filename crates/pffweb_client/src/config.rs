//! Client configuration, read from a RON file.
//!
//! A missing file yields the defaults; a file that exists but cannot be read
//! or parsed is an error.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use client_logging::client_info;
use pffweb_engine::SearchSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const DEFAULT_CONFIG_FILENAME: &str = "pffweb.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("invalid base url {url:?}: {source}")]
    BaseUrl {
        url: String,
        source: url::ParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub debounce_ms: u64,
    pub reconnect_delay_ms: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_response_bytes: u64,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    /// Command (program and arguments) run on every reload.
    pub on_reload: Option<Vec<String>>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8800".to_string(),
            debounce_ms: 500,
            reconnect_delay_ms: 2000,
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            max_response_bytes: 5 * 1024 * 1024,
            log_level: "info".to_string(),
            log_file: None,
            on_reload: None,
        }
    }
}

impl ClientConfig {
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.base_url).map_err(|source| ConfigError::BaseUrl {
            url: self.base_url.clone(),
            source,
        })
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn search_settings(&self) -> Result<SearchSettings, ConfigError> {
        let mut settings = SearchSettings::new(self.base_url()?);
        settings.connect_timeout = self.connect_timeout();
        settings.request_timeout = Duration::from_millis(self.request_timeout_ms);
        settings.max_bytes = self.max_response_bytes;
        Ok(settings)
    }
}

pub fn load(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            client_info!("No config at {:?}; using defaults", path);
            return Ok(ClientConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
