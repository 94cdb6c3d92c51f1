use std::time::Duration;

use crate::error_handler::{
    Lookup, Result, env_opt, env_opt_u64, process_env, validate_http_endpoint, validate_positive,
};

/// Base URL used when `DEVASSIST_API_URL` is not set (the backend's dev port).
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Request timeout used when `DEVASSIST_API_TIMEOUT_SECS` is not set.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the analysis backend.
///
/// # Fields
///
/// - `base_url`: scheme + host (+ optional prefix) every path is joined onto.
/// - `timeout_secs`: per-request timeout; `None` falls back to [`DEFAULT_TIMEOUT_SECS`].
///
/// # Examples
///
/// ```
/// use analysis_api::ApiConfig;
///
/// let cfg = ApiConfig::new("http://127.0.0.1:9000/");
/// assert_eq!(cfg.base(), "http://127.0.0.1:9000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Backend base URL, e.g. `http://localhost:8000`.
    pub base_url: String,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ApiConfig {
    /// Config for `base_url` with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Loads the config from process environment.
    ///
    /// # Env
    /// - `DEVASSIST_API_URL` (optional, default [`DEFAULT_BASE_URL`])
    /// - `DEVASSIST_API_TIMEOUT_SECS` (optional, default [`DEFAULT_TIMEOUT_SECS`])
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&process_env)
    }

    /// Same as [`ApiConfig::from_env`] over an arbitrary key/value source.
    ///
    /// # Errors
    /// - [`crate::ConfigError::InvalidFormat`] if the URL lacks an http(s) scheme
    /// - [`crate::ConfigError::InvalidNumber`] / [`crate::ConfigError::OutOfRange`] for a bad timeout
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let base_url =
            env_opt(lookup, "DEVASSIST_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs =
            env_opt_u64(lookup, "DEVASSIST_API_TIMEOUT_SECS")?.or(Some(DEFAULT_TIMEOUT_SECS));

        let cfg = Self {
            base_url,
            timeout_secs,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates URL scheme and timeout.
    pub fn validate(&self) -> Result<()> {
        validate_http_endpoint("DEVASSIST_API_URL", &self.base_url)?;
        if let Some(t) = self.timeout_secs {
            validate_positive("timeout_secs", t)?;
        }
        Ok(())
    }

    /// Base URL without trailing slashes.
    pub fn base(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    /// Effective request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Joins `path` onto the base URL, tolerating missing/duplicate slashes.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base(), path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handler::{ApiError, ConfigError};

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = ApiConfig::from_lookup(&|_| None).unwrap();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn env_values_override_defaults() {
        let lookup = |k: &str| match k {
            "DEVASSIST_API_URL" => Some("https://assist.internal/api/".to_string()),
            "DEVASSIST_API_TIMEOUT_SECS" => Some("5".to_string()),
            _ => None,
        };
        let cfg = ApiConfig::from_lookup(&lookup).unwrap();
        assert_eq!(cfg.url("/analyze-code"), "https://assist.internal/api/analyze-code");
        assert_eq!(cfg.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn rejects_schemeless_url_and_zero_timeout() {
        let bad_url = |k: &str| (k == "DEVASSIST_API_URL").then(|| "localhost:8000".to_string());
        assert!(matches!(
            ApiConfig::from_lookup(&bad_url),
            Err(ApiError::Config(ConfigError::InvalidFormat { .. }))
        ));

        let zero = |k: &str| (k == "DEVASSIST_API_TIMEOUT_SECS").then(|| "0".to_string());
        assert!(matches!(
            ApiConfig::from_lookup(&zero),
            Err(ApiError::Config(ConfigError::OutOfRange { .. }))
        ));
    }
}
