//! Batch processing of offered files.
//!
//! A batch (one drop, one picker selection) is validated up front; rejected
//! candidates are dropped silently. Accepted files are processed concurrently
//! and independently: one failing read or upload never blocks the others.
//! The callback runs once per accepted file, in completion order, always from
//! the task awaiting [`FileIntake::process_batch`], so callers can mutate their
//! state from it without locking.

use std::fmt;
use std::str::FromStr;

use analysis_api::{AnalysisBackend, UploadPayload};
use futures::stream::{self, StreamExt};
use lang_detect::{DetectedLanguage, detect_language};
use tracing::{debug, instrument, warn};

use crate::accept::{AcceptList, Rejection};
use crate::candidate::{FileCandidate, FileId, UploadedFile, decode_text};
use crate::errors::UnknownIntakeMode;

/// Shown for a file whose upload failed.
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload file.";

/// Shown for a file that could not be read from disk.
pub const READ_FAILED_MESSAGE: &str = "Failed to read file.";

/// Default number of files processed at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// What happens to an accepted file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IntakeMode {
    /// Decode the file as text locally and hand the text to the caller.
    #[default]
    ReadLocal,
    /// Send the raw file to `POST /upload-file` and hand back the server message.
    Upload,
}

impl IntakeMode {
    /// The accept-list preset that goes with this mode.
    pub fn default_accept_list(&self) -> AcceptList {
        match self {
            IntakeMode::ReadLocal => AcceptList::read_local(),
            IntakeMode::Upload => AcceptList::upload(),
        }
    }
}

impl fmt::Display for IntakeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IntakeMode::ReadLocal => "read",
            IntakeMode::Upload => "upload",
        })
    }
}

impl FromStr for IntakeMode {
    type Err = UnknownIntakeMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" | "local" => Ok(IntakeMode::ReadLocal),
            "upload" | "remote" => Ok(IntakeMode::Upload),
            _ => Err(UnknownIntakeMode(s.to_string())),
        }
    }
}

/// Per-file result payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomePayload {
    /// File was decoded locally.
    Read(UploadedFile),
    /// Backend accepted the upload and answered with this message.
    Uploaded { message: String },
    /// Processing failed; `message` is the user-facing placeholder.
    Failed { message: String },
}

/// Result of processing one accepted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub id: FileId,
    pub name: String,
    pub size: u64,
    pub language: DetectedLanguage,
    pub payload: OutcomePayload,
}

impl FileOutcome {
    /// Text to display for this file (content, server message, or failure placeholder).
    pub fn text(&self) -> &str {
        match &self.payload {
            OutcomePayload::Read(file) => &file.content,
            OutcomePayload::Uploaded { message } | OutcomePayload::Failed { message } => message,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.payload, OutcomePayload::Failed { .. })
    }
}

/// Counters for one processed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Files that passed validation (callback invocations).
    pub accepted: usize,
    /// Files whose processing failed (subset of `accepted`).
    pub failed: usize,
    /// Validation rejections, in input order.
    pub rejected: Vec<Rejection>,
}

/// The file intake: validation plus per-file processing.
#[derive(Debug, Clone)]
pub struct FileIntake {
    accept: AcceptList,
    mode: IntakeMode,
    concurrency: usize,
}

impl FileIntake {
    /// Intake with an explicit accept-list.
    pub fn new(mode: IntakeMode, accept: AcceptList) -> Self {
        Self {
            accept,
            mode,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Intake with the mode's preset accept-list.
    pub fn for_mode(mode: IntakeMode) -> Self {
        Self::new(mode, mode.default_accept_list())
    }

    /// Caps simultaneous reads/uploads (at least 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn mode(&self) -> IntakeMode {
        self.mode
    }

    pub fn accept_list(&self) -> &AcceptList {
        &self.accept
    }

    /// Splits a batch into accepted candidates and rejections, preserving order.
    pub fn partition(&self, candidates: Vec<FileCandidate>) -> (Vec<FileCandidate>, Vec<Rejection>) {
        let mut accepted = Vec::with_capacity(candidates.len());
        let mut rejected = Vec::new();
        for c in candidates {
            match self.accept.check(&c) {
                Ok(()) => accepted.push(c),
                Err(r) => {
                    debug!(reason = %r, "file rejected");
                    rejected.push(r);
                }
            }
        }
        (accepted, rejected)
    }

    /// Validates and processes one batch, invoking `on_accepted` once per accepted file.
    ///
    /// `backend` is only used in [`IntakeMode::Upload`]. No retries: each file
    /// gets exactly one attempt.
    #[instrument(skip_all, fields(files = candidates.len(), mode = %self.mode))]
    pub async fn process_batch<F>(
        &self,
        candidates: Vec<FileCandidate>,
        backend: &dyn AnalysisBackend,
        mut on_accepted: F,
    ) -> BatchSummary
    where
        F: FnMut(FileOutcome),
    {
        let (accepted, rejected) = self.partition(candidates);
        let mut summary = BatchSummary {
            accepted: accepted.len(),
            failed: 0,
            rejected,
        };

        if accepted.is_empty() {
            debug!("no valid files in batch");
            return summary;
        }

        let mut outcomes = stream::iter(accepted)
            .map(|c| self.process_one(c, backend))
            .buffer_unordered(self.concurrency);

        while let Some(outcome) = outcomes.next().await {
            if outcome.is_failure() {
                summary.failed += 1;
            }
            on_accepted(outcome);
        }

        debug!(
            accepted = summary.accepted,
            failed = summary.failed,
            rejected = summary.rejected.len(),
            "batch processed"
        );
        summary
    }

    async fn process_one(&self, c: FileCandidate, backend: &dyn AnalysisBackend) -> FileOutcome {
        let id = c.id;
        let name = c.name.clone();
        let mime = c.declared_mime.clone();
        let size = c.size;
        let language = detect_language(&name);

        let payload = match c.into_bytes().await {
            Err(e) => {
                warn!(file = %name, error = %e, "reading file failed");
                OutcomePayload::Failed {
                    message: READ_FAILED_MESSAGE.to_string(),
                }
            }
            Ok(bytes) => match self.mode {
                IntakeMode::ReadLocal => OutcomePayload::Read(UploadedFile {
                    name: name.clone(),
                    content: decode_text(&bytes),
                    mime,
                    size,
                }),
                IntakeMode::Upload => {
                    let upload = UploadPayload {
                        file_name: name.clone(),
                        mime,
                        bytes,
                    };
                    match backend.upload(&upload).await {
                        Ok(message) => OutcomePayload::Uploaded { message },
                        Err(e) => {
                            warn!(file = %name, error = %e, "error uploading file");
                            OutcomePayload::Failed {
                                message: UPLOAD_FAILED_MESSAGE.to_string(),
                            }
                        }
                    }
                }
            },
        };

        FileOutcome {
            id,
            name,
            size,
            language,
            payload,
        }
    }
}
