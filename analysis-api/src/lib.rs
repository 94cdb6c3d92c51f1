//! Client side of the AI Developer Assistant analysis API.
//!
//! - [`ApiClient`]: reqwest-based wrapper with a fixed base URL
//! - [`AnalysisBackend`]: the seam the intake and workbench depend on
//! - [`HealthService`]: `GET /` probe
//! - [`telemetry`]: tracing layer/filter shared by the binary

pub mod backend;
pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod services;
pub mod telemetry;

#[cfg(test)]
mod test_support;

pub use backend::{AnalysisBackend, BackendFuture};
pub use config::api_config::ApiConfig;
pub use config::endpoint::Endpoint;
pub use error_handler::{ApiError, ConfigError, Result};
pub use health_service::{HealthService, HealthStatus};
pub use services::api_client::{ApiClient, UploadPayload};
