//! Unified error handling for `analysis-api`.
//!
//! This module exposes a single top-level error type [`ApiError`] for the whole
//! library and groups configuration problems in the nested [`ConfigError`].
//! Small helpers for reading/validating environment values are provided and
//! return the unified [`Result<T>`] alias. Other crates of the workspace reuse
//! them for their own settings.
//!
//! All messages include the suffix `[Analysis API]` to simplify attribution in logs.

use reqwest::StatusCode;
use std::str::FromStr;
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Key/value source used by the config loaders.
///
/// Production code passes a closure over `std::env::var`; tests pass a map,
/// which keeps them free of process-global environment mutation.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `analysis-api` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ApiError {
    /// Configuration/validation errors (startup).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Underlying HTTP transport error (connect, timeout, body read).
    #[error("[Analysis API] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),

    /// Upstream returned a non-successful HTTP status.
    #[error("[Analysis API] HTTP {status} from {url}: {snippet}")]
    HttpStatus {
        /// Numeric HTTP status code.
        status: StatusCode,
        /// Request URL.
        url: String,
        /// Short snippet of the response body (trimmed).
        snippet: String,
    },

    /// Response payload could not be decoded as expected.
    #[error("[Analysis API] decode error: {0}")]
    Decode(String),

    /// The multipart body could not be assembled (e.g. malformed MIME type).
    #[error("[Analysis API] invalid upload: {0}")]
    InvalidUpload(String),
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required variable is missing or empty.
    #[error("[Analysis API] missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse (timeouts, limits).
    #[error("[Analysis API] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `DEVASSIST_API_TIMEOUT_SECS`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u64`).
        reason: &'static str,
    },

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[Analysis API] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `DEVASSIST_API_URL`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },

    /// A numeric field was outside of the allowed range.
    #[error("[Analysis API] {field} is out of range: {detail}")]
    OutOfRange {
        /// Field name (e.g., `timeout_secs`).
        field: &'static str,
        /// Description of the expected range.
        detail: &'static str,
    },

    /// Value is not one of the accepted choices.
    #[error("[Analysis API] {var} has unsupported value `{value}` (expected one of: {expected})")]
    InvalidChoice {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `Result<T>`)                                  */
/* ------------------------------------------------------------------------- */

/// Reads process environment. Pass as `&process_env` to the `from_lookup` loaders.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Returns a non-empty, trimmed value or `None`.
pub fn env_opt(lookup: Lookup<'_>, name: &str) -> Option<String> {
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Fetches a required, non-empty value.
///
/// # Errors
/// Returns [`ApiError::Config`] with [`ConfigError::MissingVar`] if the
/// variable is absent or empty.
pub fn must_env(lookup: Lookup<'_>, name: &'static str) -> Result<String> {
    env_opt(lookup, name).ok_or_else(|| ConfigError::MissingVar(name).into())
}

/// Parses an optional `u64` (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`ConfigError::InvalidNumber`] if the variable is set but not a valid `u64`.
pub fn env_opt_u64(lookup: Lookup<'_>, name: &'static str) -> Result<Option<u64>> {
    env_opt_parse(lookup, name, "expected u64")
}

/// Parses an optional `usize` (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`ConfigError::InvalidNumber`] if the variable is set but not a valid `usize`.
pub fn env_opt_usize(lookup: Lookup<'_>, name: &'static str) -> Result<Option<usize>> {
    env_opt_parse(lookup, name, "expected usize")
}

fn env_opt_parse<T: FromStr>(
    lookup: Lookup<'_>,
    name: &'static str,
    reason: &'static str,
) -> Result<Option<T>> {
    match env_opt(lookup, name) {
        Some(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var: name, reason }.into()),
        None => Ok(None),
    }
}

/* ------------------------------------------------------------------------- */
/* Validation helpers                                                        */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`ConfigError::InvalidFormat`] when the string does not start with
/// a valid HTTP scheme.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    let value = value.trim();
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Validates that an integer is strictly positive.
///
/// # Errors
/// Returns [`ConfigError::OutOfRange`] for zero.
pub fn validate_positive(field: &'static str, value: u64) -> Result<()> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            detail: "expected a value greater than 0",
        }
        .into())
    }
}

/// Trims a response body to a short, single-line snippet for error messages.
pub fn make_snippet(body: &str) -> String {
    body.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(240)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn blank_values_count_as_unset() {
        let lookup = lookup_from(&[("A", "   ")]);
        assert_eq!(env_opt(&lookup, "A"), None);
        assert!(matches!(
            must_env(&lookup, "A"),
            Err(ApiError::Config(ConfigError::MissingVar("A")))
        ));
    }

    #[test]
    fn numbers_parse_or_fail_loudly() {
        let lookup = lookup_from(&[("N", " 42 "), ("BAD", "forty")]);
        assert_eq!(env_opt_u64(&lookup, "N").unwrap(), Some(42));
        assert_eq!(env_opt_usize(&lookup, "MISSING").unwrap(), None);
        assert!(matches!(
            env_opt_u64(&lookup, "BAD"),
            Err(ApiError::Config(ConfigError::InvalidNumber { var: "BAD", .. }))
        ));
    }

    #[test]
    fn endpoint_scheme_is_required() {
        assert!(validate_http_endpoint("URL", "http://localhost:8000").is_ok());
        assert!(validate_http_endpoint("URL", "https://api.example.com").is_ok());
        assert!(validate_http_endpoint("URL", "localhost:8000").is_err());
    }

    #[test]
    fn snippet_is_single_line_and_bounded() {
        let body = format!("line one\nline   two\n{}", "x".repeat(500));
        let s = make_snippet(&body);
        assert!(s.starts_with("line one line two"));
        assert_eq!(s.chars().count(), 240);
    }
}
