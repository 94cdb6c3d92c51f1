//! Editor buffer with an inline suggestion overlay.
//!
//! Suggestions are mock lint hints computed locally from the buffer. Every
//! [`EditorSession::get_suggestions`] call replaces the whole overlay; nothing
//! is merged with the previous set.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use colored::Colorize;
use file_intake::decode_text;
use lang_detect::{DetectedLanguage, detect_language};
use regex::Regex;
use tracing::{debug, instrument};

use crate::error::{WorkbenchError, WorkbenchResult};
use crate::highlight::{gutter_width, highlight_line};

/// Lines longer than this get a wrapping hint.
pub const MAX_LINE_CHARS: usize = 100;

static DEBUG_OUTPUT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\bprint\(|\bconsole\.(?:log|debug|info)\(|System\.(?:out|err)\.print(?:ln|f)?\(")
        .ok()
});

static MARKER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\b(TODO|FIXME)\b").ok());

/// One annotation: 1-based line plus hover text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub line: usize,
    pub message: String,
}

impl Suggestion {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Current annotation set, ordered by line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionOverlay {
    suggestions: Vec<Suggestion>,
}

impl SuggestionOverlay {
    /// Replaces the full set.
    pub fn replace(&mut self, mut suggestions: Vec<Suggestion>) {
        suggestions.sort_by_key(|s| s.line);
        self.suggestions = suggestions;
    }

    pub fn clear(&mut self) {
        self.suggestions.clear();
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn on_line(&self, line: usize) -> impl Iterator<Item = &Suggestion> {
        self.suggestions.iter().filter(move |s| s.line == line)
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }
}

/// Mock hints for one buffer.
pub fn mock_suggestions(buffer: &str) -> Vec<Suggestion> {
    let mut out = Vec::new();
    for (idx, line) in buffer.lines().enumerate() {
        let n = idx + 1;
        if DEBUG_OUTPUT.as_ref().is_some_and(|re| re.is_match(line)) {
            out.push(Suggestion::new(n, "Debug output; remove before committing."));
        }
        if let Some(caps) = MARKER.as_ref().and_then(|re| re.captures(line)) {
            let tag = caps.get(1).map_or("TODO", |m| m.as_str());
            out.push(Suggestion::new(n, format!("Unresolved {tag} marker.")));
        }
        if line.ends_with([' ', '\t']) {
            out.push(Suggestion::new(n, "Trailing whitespace."));
        }
        let chars = line.chars().count();
        if chars > MAX_LINE_CHARS {
            out.push(Suggestion::new(
                n,
                format!("Line is {chars} characters long; wrap at {MAX_LINE_CHARS}."),
            ));
        }
        if line.starts_with('\t') {
            out.push(Suggestion::new(n, "Tab indentation; use spaces."));
        }
    }
    out
}

/// An open buffer plus its overlay.
#[derive(Debug, Clone)]
pub struct EditorSession {
    path: Option<PathBuf>,
    name: String,
    language: DetectedLanguage,
    buffer: String,
    overlay: SuggestionOverlay,
    open: bool,
}

impl EditorSession {
    /// Session over in-memory text; the language comes from `name`.
    pub fn from_text(name: impl Into<String>, buffer: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            language: detect_language(&name),
            path: None,
            name,
            buffer: buffer.into(),
            overlay: SuggestionOverlay::default(),
            open: true,
        }
    }

    /// Loads a file from disk.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> WorkbenchResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| WorkbenchError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mut session = Self::from_text(name, decode_text(&bytes));
        session.path = Some(path.to_path_buf());
        debug!(language = %session.language, "editor session opened");
        Ok(session)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn language(&self) -> DetectedLanguage {
        self.language
    }

    pub fn set_language(&mut self, language: DetectedLanguage) {
        self.language = language;
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Edits do not touch the overlay until the next `get_suggestions`.
    pub fn set_buffer(&mut self, buffer: impl Into<String>) {
        self.buffer = buffer.into();
    }

    pub fn overlay(&self) -> &SuggestionOverlay {
        &self.overlay
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Recomputes hints and replaces the overlay with them.
    pub fn get_suggestions(&mut self) -> &[Suggestion] {
        if self.open {
            self.overlay.replace(mock_suggestions(&self.buffer));
            debug!(count = self.overlay.suggestions().len(), "suggestions refreshed");
        }
        self.overlay.suggestions()
    }

    /// Tears the session down; the overlay is cleared and stays empty.
    pub fn close(&mut self) {
        self.overlay.clear();
        self.open = false;
    }

    /// Highlighted buffer; annotated lines get a gutter marker and their hover text.
    pub fn render(&self) -> String {
        let lines: Vec<&str> = self.buffer.lines().collect();
        let width = gutter_width(lines.len());
        let mut out = format!(
            "{} ({})\n",
            self.name.bold(),
            self.language.label()
        );
        for (idx, line) in lines.iter().enumerate() {
            let n = idx + 1;
            let hints: Vec<&str> = self.overlay.on_line(n).map(|s| s.message.as_str()).collect();
            let marker = if hints.is_empty() { " ".normal() } else { "●".yellow().bold() };
            out.push_str(&format!(
                "{} {} | {}",
                format!("{n:>width$}").dimmed(),
                marker,
                highlight_line(line, self.language)
            ));
            if !hints.is_empty() {
                out.push_str(&format!("  {}", format!("<- {}", hints.join("; ")).yellow()));
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_patterns_compile() {
        assert!(DEBUG_OUTPUT.is_some());
        assert!(MARKER.is_some());
    }

    #[test]
    fn detects_each_kind_of_hint() {
        let long = format!("x = '{}'", "a".repeat(120));
        let buffer = format!("print(x)\n# TODO: tidy\ny = 1 \n{long}\n\tz = 2\nclean = True");
        let hints = mock_suggestions(&buffer);

        let lines: Vec<usize> = hints.iter().map(|s| s.line).collect();
        assert_eq!(lines, [1, 2, 3, 4, 5]);
        assert!(hints[0].message.starts_with("Debug output"));
        assert_eq!(hints[1].message, "Unresolved TODO marker.");
        assert_eq!(hints[2].message, "Trailing whitespace.");
        assert!(hints[3].message.contains("wrap at 100"));
        assert_eq!(hints[4].message, "Tab indentation; use spaces.");
    }

    #[test]
    fn debug_output_is_recognised_across_languages() {
        for line in ["console.log(x);", "System.out.println(x);", "  print(value)"] {
            assert_eq!(mock_suggestions(line).len(), 1, "{line}");
        }
        assert!(mock_suggestions("fingerprint(x)").is_empty());
    }

    #[test]
    fn second_request_replaces_the_first_set() {
        let mut s = EditorSession::from_text("app.js", "console.log(1);\nlet a = 1;");
        assert_eq!(s.get_suggestions().len(), 1);
        assert_eq!(s.overlay().suggestions()[0].line, 1);

        s.set_buffer("let a = 1;\n// FIXME later");
        let second = s.get_suggestions().to_vec();
        assert_eq!(second, [Suggestion::new(2, "Unresolved FIXME marker.")]);
        assert_eq!(s.overlay().suggestions(), second.as_slice());
    }

    #[test]
    fn clean_buffer_clears_previous_hints() {
        let mut s = EditorSession::from_text("a.py", "print(1)");
        s.get_suggestions();
        s.set_buffer("x = 1");
        assert!(s.get_suggestions().is_empty());
    }

    #[test]
    fn render_marks_annotated_lines() {
        colored::control::set_override(false);
        let mut s = EditorSession::from_text("main.py", "x = 1\nprint(x)");
        s.get_suggestions();
        let out = s.render();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "main.py (Python)");
        assert_eq!(lines[1], "1   | x = 1");
        assert_eq!(
            lines[2],
            "2 ● | print(x)  <- Debug output; remove before committing."
        );
    }

    #[test]
    fn close_clears_overlay_and_stops_updates() {
        let mut s = EditorSession::from_text("a.py", "print(1)");
        s.get_suggestions();
        s.close();
        assert!(!s.is_open());
        assert!(s.overlay().is_empty());
        assert!(s.get_suggestions().is_empty());
    }

    #[tokio::test]
    async fn open_reads_file_and_detects_language() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Main.java");
        std::fs::write(&path, "class Main {}\n").unwrap();

        let s = EditorSession::open(&path).await.unwrap();
        assert_eq!(s.language(), DetectedLanguage::Java);
        assert_eq!(s.buffer(), "class Main {}\n");
        assert_eq!(s.path(), Some(path.as_path()));

        let err = EditorSession::open(dir.path().join("missing.py")).await.unwrap_err();
        assert!(matches!(err, WorkbenchError::Io { .. }));
    }
}
