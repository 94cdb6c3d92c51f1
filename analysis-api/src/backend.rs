use std::{future::Future, pin::Pin};

use crate::config::endpoint::Endpoint;
use crate::error_handler::Result;
use crate::services::api_client::{ApiClient, UploadPayload};

/// Boxed, `Send` future returned by [`AnalysisBackend`] calls.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// The analysis collaborator as seen by the intake and the workbench.
///
/// [`ApiClient`] is the production implementation; tests plug in scripted
/// backends to observe calls and inject failures.
pub trait AnalysisBackend: Send + Sync {
    /// Sends free text to a text route and returns the result text.
    fn analyze<'a>(&'a self, endpoint: Endpoint, text: &'a str) -> BackendFuture<'a, String>;

    /// Uploads one file and returns the server's message.
    fn upload<'a>(&'a self, file: &'a UploadPayload) -> BackendFuture<'a, String>;
}

impl AnalysisBackend for ApiClient {
    fn analyze<'a>(&'a self, endpoint: Endpoint, text: &'a str) -> BackendFuture<'a, String> {
        Box::pin(ApiClient::analyze(self, endpoint, text))
    }

    fn upload<'a>(&'a self, file: &'a UploadPayload) -> BackendFuture<'a, String> {
        Box::pin(self.upload_file(file))
    }
}
