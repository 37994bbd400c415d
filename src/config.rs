//! Application configuration
//!
//! Holds everything the client and cache need at construction time. Reading
//! the process environment happens only through [`Config::from_env`], which
//! the binary calls once at startup.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use thiserror::Error;

use crate::api::client::{DEFAULT_TIMEOUT, HENRIK_BASE_URL};

/// Environment variable holding the HenrikDev API key
pub const API_KEY_VAR: &str = "HENRIK_API_KEY";
/// Environment variable overriding the default region
pub const REGION_VAR: &str = "DEFAULT_REGION";
/// Environment variable overriding the API base URL
pub const BASE_URL_VAR: &str = "HENRIK_BASE_URL";
/// Environment variable overriding the request rate
pub const RATE_VAR: &str = "HENRIK_RATE_PER_MINUTE";
/// Environment variable overriding the cache directory
pub const DATA_DIR_VAR: &str = "VALOCACHE_DATA_DIR";

/// Region used when an account lookup does not report one
pub const DEFAULT_REGION: &str = "na";

/// Requests per minute allowed by the default HenrikDev key tier
pub const DEFAULT_RATE_PER_MINUTE: u32 = 30;

/// Errors raised while building the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is missing or empty
    #[error("{0} is not set")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Runtime configuration for the client and cache
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Static credential sent in the `Authorization` header
    pub api_key: String,
    /// Region assumed when the account lookup omits one
    pub default_region: String,
    /// Root URL of the HenrikDev API
    pub base_url: String,
    /// Maximum requests in any trailing 60-second window
    pub rate_per_minute: u32,
    /// Connect and read timeout for each request
    pub timeout: Duration,
    /// Directory holding payload records and the index
    pub data_dir: PathBuf,
}

impl Config {
    /// Creates a configuration with defaults for everything but the API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            default_region: DEFAULT_REGION.to_string(),
            base_url: HENRIK_BASE_URL.to_string(),
            rate_per_minute: DEFAULT_RATE_PER_MINUTE,
            timeout: DEFAULT_TIMEOUT,
            data_dir: default_data_dir(),
        }
    }

    /// Reads the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get(API_KEY_VAR).ok_or(ConfigError::Missing(API_KEY_VAR))?;
        let mut config = Self::new(api_key);

        if let Some(region) = get(REGION_VAR) {
            config.default_region = region.to_lowercase();
        }
        if let Some(base_url) = get(BASE_URL_VAR) {
            config.base_url = base_url;
        }
        if let Some(rate) = get(RATE_VAR) {
            config.rate_per_minute = match rate.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: RATE_VAR,
                        expected: "a positive integer",
                        value: rate,
                    })
                }
            };
        }
        if let Some(dir) = get(DATA_DIR_VAR) {
            config.data_dir = PathBuf::from(dir);
        }

        Ok(config)
    }
}

/// Returns the XDG cache directory for valocache, or `data/raw` if none exists
pub fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "valocache")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("data").join("raw"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_new_uses_defaults() {
        let config = Config::new("HDEV-key");
        assert_eq!(config.api_key, "HDEV-key");
        assert_eq!(config.default_region, "na");
        assert_eq!(config.base_url, "https://api.henrikdev.xyz");
        assert_eq!(config.rate_per_minute, 30);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_missing_api_key() {
        let result = Config::from_lookup(lookup_from(&[]));
        match result {
            Err(ConfigError::Missing(var)) => assert_eq!(var, "HENRIK_API_KEY"),
            other => panic!("expected missing key error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_api_key_counts_as_missing() {
        let result = Config::from_lookup(lookup_from(&[("HENRIK_API_KEY", "   ")]));
        assert!(matches!(result, Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_all_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("HENRIK_API_KEY", "HDEV-abc"),
            ("DEFAULT_REGION", "EU"),
            ("HENRIK_BASE_URL", "http://localhost:9000"),
            ("HENRIK_RATE_PER_MINUTE", "90"),
            ("VALOCACHE_DATA_DIR", "/tmp/valocache"),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "HDEV-abc");
        assert_eq!(config.default_region, "eu");
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.rate_per_minute, 90);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/valocache"));
    }

    #[test]
    fn test_invalid_rate() {
        for bad in ["fast", "0", "-5"] {
            let result = Config::from_lookup(lookup_from(&[
                ("HENRIK_API_KEY", "HDEV-abc"),
                ("HENRIK_RATE_PER_MINUTE", bad),
            ]));
            let err = result.unwrap_err();
            assert!(err.to_string().contains("HENRIK_RATE_PER_MINUTE"));
            assert!(err.to_string().contains(bad));
        }
    }

    #[test]
    fn test_default_data_dir_mentions_project() {
        let dir = default_data_dir();
        let dir_str = dir.to_string_lossy();
        assert!(dir_str.contains("valocache") || dir_str.ends_with("raw"));
    }
}
