/// Backend routes consumed by the client.
///
/// The analysis routes take `{ "text": ... }` and answer with `{ "result": ... }`;
/// the upload route takes a multipart `file` part and answers with `{ "message": ... }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `POST /upload-file`
    UploadFile,
    /// `POST /analyze-text`
    AnalyzeText,
    /// `POST /analyze-code`
    AnalyzeCode,
    /// `POST /detect-errors`
    DetectErrors,
    /// `POST /summarize-text`
    SummarizeText,
}

impl Endpoint {
    /// Route path relative to the base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::UploadFile => "/upload-file",
            Endpoint::AnalyzeText => "/analyze-text",
            Endpoint::AnalyzeCode => "/analyze-code",
            Endpoint::DetectErrors => "/detect-errors",
            Endpoint::SummarizeText => "/summarize-text",
        }
    }

    /// `true` for the JSON text routes.
    pub fn takes_text(&self) -> bool {
        !matches!(self, Endpoint::UploadFile)
    }
}
