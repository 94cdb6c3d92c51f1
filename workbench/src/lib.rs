//! Orchestration layer of the developer assistant.
//!
//! - [`Workbench`]: text entry, task selection, file batches, result board
//! - [`editor::EditorSession`]: buffer with mock inline suggestions
//! - [`highlight`]: regex-based terminal highlighting
//! - [`WorkbenchConfig`]: settings from the environment

pub mod config;
pub mod editor;
pub mod error;
pub mod highlight;
pub mod state;
pub mod workbench;

pub use config::{AnalysisMode, DEFAULT_MAX_TEXT_CHARS, MergePolicy, WorkbenchConfig};
pub use editor::{EditorSession, Suggestion, SuggestionOverlay};
pub use error::{
    UnknownAnalysisMode, UnknownMergePolicy, UnknownTask, WorkbenchError, WorkbenchResult,
};
pub use state::{BoardSnapshot, ResultBoard, ResultEntry, ResultKey, TaskSelection, ViewState};
pub use workbench::{
    EMPTY_TEXT_MESSAGE, NO_RESULTS_MESSAGE, REQUEST_FAILED_MESSAGE, SAMPLE_RESULT, Workbench,
};
