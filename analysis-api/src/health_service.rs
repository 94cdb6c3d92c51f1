//! Health probe for the analysis backend.
//!
//! The backend answers `GET /` with `{ "message": "Welcome ..." }`. The probe
//! measures latency and reports a JSON-serializable [`HealthStatus`].
//! [`HealthService::check`] is resilient and never fails (errors mapped to `ok=false`);
//! [`HealthService::try_probe`] returns a strict `Result`.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::api_config::ApiConfig;
use crate::error_handler::{ApiError, Result};
use crate::services::api_client::{ApiClient, MessageResponse};

/// A serializable health snapshot for one backend.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Target base URL.
    pub endpoint: String,
    /// Overall health flag.
    pub ok: bool,
    /// Measured HTTP latency in milliseconds.
    pub latency_ms: u128,
    /// Backend greeting on success, error text on failure.
    pub message: String,
}

/// Health checker with its own short timeout, independent of analysis calls.
pub struct HealthService {
    default_timeout: Duration,
}

impl HealthService {
    /// Creates a health service with an optional timeout (seconds, default 10).
    pub fn new(timeout_secs: Option<u64>) -> Self {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        debug!(default_timeout_secs = timeout.as_secs(), "HealthService initialized");
        Self {
            default_timeout: timeout,
        }
    }

    /// Probes `cfg`'s backend. Never returns an error.
    pub async fn check(&self, cfg: &ApiConfig) -> HealthStatus {
        let start = Instant::now();
        match self.try_probe(cfg).await {
            Ok(status) => {
                info!(
                    endpoint = %status.endpoint,
                    latency_ms = status.latency_ms,
                    "health probe completed"
                );
                status
            }
            Err(err) => {
                let status = HealthStatus {
                    endpoint: cfg.base().to_string(),
                    ok: false,
                    latency_ms: start.elapsed().as_millis(),
                    message: err.to_string(),
                };
                warn!(
                    endpoint = %status.endpoint,
                    latency_ms = status.latency_ms,
                    message = %status.message,
                    "health probe failed"
                );
                status
            }
        }
    }

    /// Strict probe: `GET {base}/`, expect 2xx and a `message` field.
    ///
    /// # Errors
    /// Any [`ApiError`] raised by the request.
    pub async fn try_probe(&self, cfg: &ApiConfig) -> Result<HealthStatus> {
        let probe_cfg = ApiConfig {
            base_url: cfg.base_url.clone(),
            timeout_secs: Some(self.default_timeout.as_secs().max(1)),
        };
        let client = ApiClient::new(probe_cfg)?;

        let start = Instant::now();
        let body: MessageResponse = client.get("/").await?;
        let latency_ms = start.elapsed().as_millis();

        if body.message.trim().is_empty() {
            return Err(ApiError::Decode("empty greeting from backend".into()));
        }

        Ok(HealthStatus {
            endpoint: cfg.base().to_string(),
            ok: true,
            latency_ms,
            message: body.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{closed_port_base, spawn_server};
    use axum::{Json, Router, routing::get};
    use serde_json::json;

    #[tokio::test]
    async fn healthy_backend_reports_greeting() {
        let app = Router::new().route(
            "/",
            get(|| async { Json(json!({ "message": "Welcome to the AI Developer's Assistant Backend!" })) }),
        );
        let base = spawn_server(app).await;

        let status = HealthService::new(Some(2)).check(&ApiConfig::new(&base)).await;
        assert!(status.ok);
        assert!(status.message.starts_with("Welcome"));
        assert_eq!(status.endpoint, base);
    }

    #[tokio::test]
    async fn unreachable_backend_is_reported_not_raised() {
        let base = closed_port_base().await;
        let status = HealthService::new(Some(2)).check(&ApiConfig::new(&base)).await;
        assert!(!status.ok);
        assert!(status.message.contains("[Analysis API]"));
    }
}
