//! Client configuration parsed from environment variables.

use std::time::Duration;

use crate::net::types::Model;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_EXCHANGE_TIMEOUT_SECS: u64 = 90;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Whole-request timeout applied by the HTTP client.
    pub request_secs: u64,
    pub connect_secs: u64,
    /// Upper bound on one chat round trip before it takes the failure path.
    pub exchange_secs: u64,
}

impl Timeouts {
    #[must_use]
    pub fn exchange(&self) -> Duration {
        Duration::from_secs(self.exchange_secs)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            exchange_secs: DEFAULT_EXCHANGE_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin without a trailing slash.
    pub base_url: String,
    /// Model preselected on the chat page.
    pub default_model: Model,
    pub timeouts: Timeouts,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    /// Default configuration pointed at `base_url`.
    #[must_use]
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            default_model: Model::default(),
            timeouts: Timeouts::default(),
        }
    }

    /// Point the config at another backend origin.
    pub fn set_base_url(&mut self, base_url: &str) {
        self.base_url = normalize_base_url(base_url);
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `PT_BASE_URL`: default `http://localhost:5000`
    /// - `PT_MODEL`: one of the [`Model`] tags, default `gpt-3.5-turbo`
    /// - `PT_REQUEST_TIMEOUT_SECS`: default 120
    /// - `PT_CONNECT_TIMEOUT_SECS`: default 10
    /// - `PT_EXCHANGE_TIMEOUT_SECS`: default 90
    ///
    /// # Errors
    ///
    /// Returns an error if `PT_MODEL` names an unknown model.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model value names an unknown model.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("PT_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let default_model = match lookup("PT_MODEL") {
            Some(raw) => raw
                .parse::<Model>()
                .map_err(|e| ConfigError::Parse(format!("PT_MODEL: {e}")))?,
            None => Model::default(),
        };
        let timeouts = Timeouts {
            request_secs: parse_u64(&lookup, "PT_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(&lookup, "PT_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
            exchange_secs: parse_u64(&lookup, "PT_EXCHANGE_TIMEOUT_SECS", DEFAULT_EXCHANGE_TIMEOUT_SECS),
        };

        Ok(Self { base_url: normalize_base_url(&base_url), default_model, timeouts })
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
