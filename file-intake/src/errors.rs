//! Error types for the crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning paths into candidates or reading them.
///
/// Per-file processing failures are *not* errors of the batch: they surface as
/// failed [`crate::FileOutcome`]s so one bad file never blocks the others.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// Filesystem access failed.
    #[error("[File Intake] cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The path points at something that is not a regular file.
    #[error("[File Intake] not a regular file: {0}")]
    NotAFile(PathBuf),

    /// The path has no usable file name.
    #[error("[File Intake] path has no file name: {0}")]
    NoFileName(PathBuf),
}

/// Returned when a mode name is neither `read` nor `upload`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[File Intake] unknown intake mode: {0}")]
pub struct UnknownIntakeMode(pub String);

/// Result alias for intake operations.
pub type IntakeResult<T> = Result<T, IntakeError>;
