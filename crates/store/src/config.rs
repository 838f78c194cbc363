//! Runtime configuration, read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:3333";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Base URL of the catalog/stock API.
    pub api_url: String,
    /// Optional bearer token sent with catalog requests.
    pub auth_token: Option<String>,
    pub request_timeout: Duration,
    /// SQLite file for the saved cart; `None` means the OS data directory.
    pub db_path: Option<PathBuf>,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            db_path: None,
        }
    }
}

impl CartConfig {
    /// Read `CARTKIT_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    ///
    /// - `CARTKIT_API_URL` (default `http://localhost:3333`)
    /// - `CARTKIT_AUTH_TOKEN`
    /// - `CARTKIT_REQUEST_TIMEOUT_SECS` (default 10)
    /// - `CARTKIT_DB_PATH`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = non_empty("CARTKIT_API_URL").unwrap_or_else(|| {
            tracing::warn!("CARTKIT_API_URL not set; using {DEFAULT_API_URL}");
            DEFAULT_API_URL.to_string()
        });

        let request_timeout = match non_empty("CARTKIT_REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                    key: "CARTKIT_REQUEST_TIMEOUT_SECS",
                    reason: e.to_string(),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        key: "CARTKIT_REQUEST_TIMEOUT_SECS",
                        reason: "must be at least 1".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self {
            api_url,
            auth_token: non_empty("CARTKIT_AUTH_TOKEN"),
            request_timeout,
            db_path: non_empty("CARTKIT_DB_PATH").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = CartConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CartConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = CartConfig::from_lookup(lookup(&[
            ("CARTKIT_API_URL", "http://catalog.internal:8080"),
            ("CARTKIT_AUTH_TOKEN", "secret"),
            ("CARTKIT_REQUEST_TIMEOUT_SECS", "3"),
            ("CARTKIT_DB_PATH", "/tmp/cart.db"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "http://catalog.internal:8080");
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/cart.db")));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = CartConfig::from_lookup(lookup(&[
            ("CARTKIT_API_URL", "  "),
            ("CARTKIT_AUTH_TOKEN", ""),
        ]))
        .unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.auth_token, None);
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let err = CartConfig::from_lookup(lookup(&[("CARTKIT_REQUEST_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "CARTKIT_REQUEST_TIMEOUT_SECS",
                ..
            }
        ));

        assert!(CartConfig::from_lookup(lookup(&[("CARTKIT_REQUEST_TIMEOUT_SECS", "0")])).is_err());
    }
}
