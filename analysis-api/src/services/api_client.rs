//! Thin client for the analysis backend.
//!
//! This module implements the whole surface the assistant consumes:
//! - `POST {base}/analyze-text|analyze-code|detect-errors|summarize-text`: JSON `{text}` → `{result}`
//! - `POST {base}/upload-file`: multipart `file` → `{message}`
//! - generic [`ApiClient::post`] / [`ApiClient::get`] for anything else
//!
//! The backend is an opaque collaborator: the client never retries and never
//! interprets results beyond extracting the text field.
//!
//! # Examples
//!
//! ```no_run
//! use analysis_api::{ApiClient, ApiConfig, Endpoint};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(ApiConfig::new("http://localhost:8000"))?;
//! let review = client.analyze(Endpoint::AnalyzeCode, "fn main() {}").await?;
//! println!("{review}");
//! # Ok(()) }
//! ```

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::api_config::ApiConfig;
use crate::config::endpoint::Endpoint;
use crate::error_handler::{ApiError, Result, make_snippet};

/// A file as it travels to `POST /upload-file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    /// File name sent in the multipart part.
    pub file_name: String,
    /// Declared MIME type, e.g. `text/plain`.
    pub mime: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

/// HTTP client bound to one backend base URL.
///
/// Reuses a single `reqwest::Client` (connection pool) with the configured timeout.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    cfg: ApiConfig,
}

impl ApiClient {
    /// Creates a new client from the given config.
    ///
    /// # Errors
    /// - [`ApiError::Config`] if the base URL or timeout is invalid
    /// - [`ApiError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: ApiConfig) -> Result<Self> {
        cfg.validate()?;

        let client = reqwest::Client::builder().timeout(cfg.timeout()).build()?;

        debug!(base = %cfg.base(), timeout_secs = cfg.timeout().as_secs(), "ApiClient initialized");
        Ok(Self { client, cfg })
    }

    /// Current connection settings.
    pub fn config(&self) -> &ApiConfig {
        &self.cfg
    }

    /// Posts a JSON body to `path` and decodes the JSON answer.
    ///
    /// # Errors
    /// - [`ApiError::HttpTransport`] for connect/timeout failures
    /// - [`ApiError::HttpStatus`] for non-2xx responses
    /// - [`ApiError::Decode`] if the body is not the expected JSON
    #[instrument(skip_all, fields(path = %path))]
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.cfg.url(path);
        debug!("POST {}", url);
        let resp = self.client.post(&url).json(body).send().await?;
        decode_json(resp, &url).await
    }

    /// Issues a GET to `path` and decodes the JSON answer.
    #[instrument(skip_all, fields(path = %path))]
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let url = self.cfg.url(path);
        debug!("GET {}", url);
        let resp = self.client.get(&url).send().await?;
        decode_json(resp, &url).await
    }

    /// Sends `text` to one of the analysis routes and returns the result text verbatim.
    ///
    /// Besides the canonical `result` key, the keys the reference backend uses
    /// per route (`analysis`, `errors`, `summary`) are accepted. Non-string
    /// results are rendered as pretty JSON.
    ///
    /// # Errors
    /// - [`ApiError::Decode`] if `endpoint` is the upload route or the body has no result field
    /// - everything [`ApiClient::post`] returns
    #[instrument(skip_all, fields(endpoint = endpoint.path(), chars = text.chars().count()))]
    pub async fn analyze(&self, endpoint: Endpoint, text: &str) -> Result<String> {
        if !endpoint.takes_text() {
            return Err(ApiError::Decode(format!(
                "{} does not accept a text body",
                endpoint.path()
            )));
        }
        let out: AnalysisResponse = self.post(endpoint.path(), &TextRequest { text }).await?;
        Ok(value_to_text(out.result))
    }

    /// Uploads a single file as multipart form data and returns the server's `message`.
    ///
    /// # Errors
    /// - [`ApiError::InvalidUpload`] if the MIME type is malformed
    /// - [`ApiError::HttpTransport`] / [`ApiError::HttpStatus`] / [`ApiError::Decode`] as for [`ApiClient::post`]
    #[instrument(skip_all, fields(file = %file.file_name, bytes = file.bytes.len()))]
    pub async fn upload_file(&self, file: &UploadPayload) -> Result<String> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime)
            .map_err(|e| ApiError::InvalidUpload(format!("{}: {e}", file.mime)))?;
        let form = Form::new().part("file", part);

        let url = self.cfg.url(Endpoint::UploadFile.path());
        debug!("POST {} (multipart)", url);
        let resp = self.client.post(&url).multipart(form).send().await?;
        let out: MessageResponse = decode_json(resp, &url).await?;
        Ok(out.message)
    }
}

/* ==========================
HTTP payloads
========================== */

/// Request body for the text routes.
#[derive(Debug, Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

/// Response body for the text routes.
#[derive(Debug, Deserialize)]
struct AnalysisResponse {
    #[serde(alias = "analysis", alias = "errors", alias = "summary")]
    result: Value,
}

/// `{ "message": ... }` body answered by `/upload-file` and `/`.
#[derive(Debug, Deserialize)]
pub(crate) struct MessageResponse {
    pub(crate) message: String,
}

/* ==========================
Helpers
========================== */

/// Maps non-2xx to [`ApiError::HttpStatus`], then decodes JSON.
async fn decode_json<R: DeserializeOwned>(resp: reqwest::Response, url: &str) -> Result<R> {
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(ApiError::HttpStatus {
            status,
            url: url.to_string(),
            snippet: make_snippet(&text),
        });
    }

    let body = resp.text().await?;
    serde_json::from_str(&body)
        .map_err(|e| ApiError::Decode(format!("serde error: {e}; body: {}", make_snippet(&body))))
}

fn value_to_text(v: Value) -> String {
    match v {
        Value::String(s) => s,
        other => serde_json::to_string_pretty(&other).unwrap_or_else(|_| other.to_string()),
    }
}
