//! View state and the result board.

use std::fmt;
use std::str::FromStr;

use analysis_api::Endpoint;
use file_intake::FileId;
use lang_detect::DetectedLanguage;
use serde::Serialize;

use crate::error::UnknownTask;

/// Task chosen for free-text submission; picks the endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskSelection {
    #[default]
    Text,
    Code,
    Logs,
}

impl TaskSelection {
    pub const ALL: [TaskSelection; 3] = [TaskSelection::Text, TaskSelection::Code, TaskSelection::Logs];

    pub fn endpoint(&self) -> Endpoint {
        match self {
            TaskSelection::Text => Endpoint::AnalyzeText,
            TaskSelection::Code => Endpoint::AnalyzeCode,
            TaskSelection::Logs => Endpoint::DetectErrors,
        }
    }

    /// Heading used for simulated results, e.g. `Code Analysis`.
    pub fn simulated_prefix(&self) -> &'static str {
        match self {
            TaskSelection::Text => "Text Analysis",
            TaskSelection::Code => "Code Analysis",
            TaskSelection::Logs => "Log File Analysis",
        }
    }
}

impl fmt::Display for TaskSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskSelection::Text => "text",
            TaskSelection::Code => "code",
            TaskSelection::Logs => "logs",
        })
    }
}

impl FromStr for TaskSelection {
    type Err = UnknownTask;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(TaskSelection::Text),
            "code" => Ok(TaskSelection::Code),
            "logs" | "log" => Ok(TaskSelection::Logs),
            _ => Err(UnknownTask(s.to_string())),
        }
    }
}

/// What the results pane currently shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    /// Nothing yet, or cleared.
    #[default]
    Idle,
    ShowingResult,
    /// Last action was rejected or every request in it failed.
    ShowingError,
}

/// Identity of a board entry. A new result with an existing key replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKey {
    File(FileId),
    Text(TaskSelection),
    Summary,
    Simulated,
}

impl fmt::Display for ResultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultKey::File(id) => write!(f, "file:{}", id.get()),
            ResultKey::Text(task) => write!(f, "text:{task}"),
            ResultKey::Summary => f.write_str("summary"),
            ResultKey::Simulated => f.write_str("simulated"),
        }
    }
}

/// One displayed result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    pub key: ResultKey,
    /// Heading shown above the result (file name or task).
    pub label: String,
    /// Grammar used to highlight `text`.
    pub language: DetectedLanguage,
    pub text: String,
    /// `text` is a failure placeholder.
    pub failed: bool,
}

/// Ordered, keyed list of results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultBoard {
    entries: Vec<ResultEntry>,
}

impl ResultBoard {
    /// Inserts `entry`, or replaces the entry with the same key at its position.
    pub fn upsert(&mut self, entry: ResultEntry) {
        match self.entries.iter_mut().find(|e| e.key == entry.key) {
            Some(slot) => *slot = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, key: &ResultKey) -> Option<&ResultEntry> {
        self.entries.iter().find(|e| e.key == *key)
    }

    pub fn entries(&self) -> &[ResultEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Serializable view of the board for `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct BoardSnapshot {
    pub view: ViewState,
    pub notice: Option<String>,
    pub language: DetectedLanguage,
    pub results: Vec<EntrySnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntrySnapshot {
    pub key: String,
    pub label: String,
    pub language: DetectedLanguage,
    pub text: String,
    pub failed: bool,
}

impl From<&ResultEntry> for EntrySnapshot {
    fn from(e: &ResultEntry) -> Self {
        Self {
            key: e.key.to_string(),
            label: e.label.clone(),
            language: e.language,
            text: e.text.clone(),
            failed: e.failed,
        }
    }
}
