//! Client configuration
//!
//! The base URL of the materials backend is configured externally, either
//! through the environment (optionally loaded from a `.env` file) or through
//! command line flags that override it.

use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const BASE_URL_ENV: &str = "MATERIALS_API_BASE_URL";
pub const TIMEOUT_ENV: &str = "MATERIALS_API_TIMEOUT_SECS";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    /// `None` leaves requests unbounded.
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Build a config from a base URL string and optional timeout in seconds
    pub fn new(base_url: &str, timeout_secs: Option<u64>) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            request_timeout: timeout_secs.map(Duration::from_secs),
        })
    }

    /// Load from `MATERIALS_API_BASE_URL` / `MATERIALS_API_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let base_url = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout_secs = match std::env::var(TIMEOUT_ENV) {
            Ok(raw) => Some(parse_timeout(&raw)?),
            Err(_) => None,
        };

        Self::new(&base_url, timeout_secs)
    }
}

/// Parse a base URL, forcing a trailing slash so relative joins keep any path prefix.
pub fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let trimmed = value.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };

    Url::parse(&normalized).map_err(|source| ConfigError::BaseUrl {
        value: value.to_string(),
        source,
    })
}

fn parse_timeout(raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse::<u64>().map_err(|_| ConfigError::Timeout {
        value: raw.to_string(),
    })
}
