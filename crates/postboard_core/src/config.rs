//! Client configuration.
//!
//! # Responsibility
//! - Provide defaults for the remote collection URL, timeouts and logging.
//! - Read overrides from environment variables.
//!
//! # Invariants
//! - `base_url` and `users_url` are absolute http(s) URLs without a
//!   trailing slash.
//! - `timeout` is never zero.

use crate::logging::{default_log_level, normalize_level};
use reqwest::Url;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_POSTS_URL: &str = "https://jsonplaceholder.typicode.com/posts";
pub const DEFAULT_USERS_URL: &str = "https://jsonplaceholder.typicode.com/users";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const ENV_API_URL: &str = "POSTBOARD_API_URL";
pub const ENV_USERS_URL: &str = "POSTBOARD_USERS_URL";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "POSTBOARD_HTTP_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "POSTBOARD_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "POSTBOARD_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidUrl { value: String, reason: String },
    InvalidTimeout(String),
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUrl { value, reason } => {
                write!(f, "invalid posts url `{value}`: {reason}")
            }
            Self::InvalidTimeout(value) => {
                write!(f, "invalid http timeout `{value}`; expected whole seconds > 0")
            }
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {}

/// Settings for the remote API client and logging bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Collection used to resolve author names.
    pub users_url: String,
    pub timeout: Duration,
    pub log_level: &'static str,
    /// Logging stays disabled when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_POSTS_URL.to_string(),
            users_url: DEFAULT_USERS_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `POSTBOARD_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            config.base_url = normalize_base_url(&url)?;
        }
        if let Some(url) = lookup(ENV_USERS_URL) {
            config.users_url = normalize_base_url(&url)?;
        }
        if let Some(timeout) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            config.timeout = parse_timeout(&timeout)?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&level).map_err(ConfigError::InvalidLogLevel)?;
        }
        if let Some(dir) = lookup(ENV_LOG_DIR) {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                config.log_dir = Some(PathBuf::from(trimmed));
            }
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.base_url = normalize_base_url(url)?;
        Ok(self)
    }

    pub fn with_users_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.users_url = normalize_base_url(url)?;
        Ok(self)
    }
}

/// Validates an http(s) URL and strips trailing slashes.
pub fn normalize_base_url(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|err| ConfigError::InvalidUrl {
        value: value.to_string(),
        reason: err.to_string(),
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl {
            value: value.to_string(),
            reason: format!("unsupported scheme `{}`", url.scheme()),
        });
    }
    Ok(trimmed.to_string())
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(value.to_string())),
    }
}
