//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: Url,
    pub log_level: Level,
    pub credentials_path: PathBuf,
    pub export_dir: PathBuf,
    pub request_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // --- Remote Service ---
        let api_url_str =
            lookup("DOCGEN_API_URL").unwrap_or_else(|| "http://localhost:8000".to_string());
        let api_url = parse_base_url(&api_url_str)
            .map_err(|e| ConfigError::InvalidValue("DOCGEN_API_URL".to_string(), e))?;

        let timeout_str =
            lookup("DOCGEN_REQUEST_TIMEOUT_SECS").unwrap_or_else(|| "120".to_string());
        let timeout_secs = timeout_str.parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(
                "DOCGEN_REQUEST_TIMEOUT_SECS".to_string(),
                format!("'{}' is not a whole number of seconds", timeout_str),
            )
        })?;

        // --- Logging ---
        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Local Files ---
        let credentials_path = match lookup("DOCGEN_CREDENTIALS_PATH") {
            Some(path) => PathBuf::from(path),
            None => dirs::config_dir()
                .map(|dir| dir.join("docgen").join("credentials.json"))
                .ok_or_else(|| ConfigError::MissingVar("DOCGEN_CREDENTIALS_PATH".to_string()))?,
        };
        let export_dir = lookup("DOCGEN_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            api_url,
            log_level,
            credentials_path,
            export_dir,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Parses the service root. A trailing slash is added so relative endpoint
/// paths join beneath it instead of replacing its last segment.
pub fn parse_base_url(raw: &str) -> Result<Url, String> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    let url = Url::parse(&with_slash).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}
