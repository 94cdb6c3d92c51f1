//! Error type for the workbench crate.
//!
//! Analysis failures never surface here: they degrade to placeholder entries
//! on the result board. What remains are startup and local I/O problems.

use std::path::PathBuf;

use analysis_api::ApiError;
use file_intake::IntakeError;
use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum WorkbenchError {
    /// Configuration or client construction failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A path could not be turned into an upload candidate.
    #[error(transparent)]
    Intake(#[from] IntakeError),

    /// Editor buffer could not be loaded.
    #[error("[Workbench] cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type WorkbenchResult<T> = Result<T, WorkbenchError>;

/// Unrecognised `--merge` / `DEVASSIST_MERGE_POLICY` value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[Workbench] unknown merge policy: {0}")]
pub struct UnknownMergePolicy(pub String);

/// Unrecognised `DEVASSIST_ANALYSIS_MODE` value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[Workbench] unknown analysis mode: {0}")]
pub struct UnknownAnalysisMode(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[Workbench] unknown task: {0}")]
pub struct UnknownTask(pub String);
