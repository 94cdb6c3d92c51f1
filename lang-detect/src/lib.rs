//! Language taxonomy for displayed results.
//!
//! The detected language is a display-only tag: it selects the highlighting
//! grammar for a result and never influences which endpoint is called.
//! Detection is a static lookup on the lowercased file extension; anything
//! unknown resolves to [`DetectedLanguage::PlainText`].

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Languages the result viewer knows how to highlight.
///
/// Keep the set tight; every variant needs a grammar in the highlighter.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectedLanguage {
    Python,
    JavaScript,
    Java,
    TypeScript,
    Html,
    Css,
    Json,
    #[default]
    PlainText,
}

impl DetectedLanguage {
    /// All variants in display order (used by the language picker).
    pub const ALL: [DetectedLanguage; 8] = [
        DetectedLanguage::JavaScript,
        DetectedLanguage::Python,
        DetectedLanguage::Java,
        DetectedLanguage::TypeScript,
        DetectedLanguage::Html,
        DetectedLanguage::Css,
        DetectedLanguage::Json,
        DetectedLanguage::PlainText,
    ];

    /// Lookup by bare extension (no leading dot). Case-insensitive.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "py" => Self::Python,
            "js" => Self::JavaScript,
            "java" => Self::Java,
            "ts" => Self::TypeScript,
            "html" => Self::Html,
            "css" => Self::Css,
            "json" => Self::Json,
            _ => Self::PlainText,
        }
    }

    /// Stable lowercase tag, e.g. `"javascript"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::Java => "java",
            Self::TypeScript => "typescript",
            Self::Html => "html",
            Self::Css => "css",
            Self::Json => "json",
            Self::PlainText => "plaintext",
        }
    }

    /// Human label for menus and headings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Python => "Python",
            Self::JavaScript => "JavaScript",
            Self::Java => "Java",
            Self::TypeScript => "TypeScript",
            Self::Html => "HTML",
            Self::Css => "CSS",
            Self::Json => "JSON",
            Self::PlainText => "Plain Text",
        }
    }
}

impl Display for DetectedLanguage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a manual override names a language we do not highlight.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown language tag: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for DetectedLanguage {
    type Err = UnknownLanguage;

    /// Parses a tag as produced by [`DetectedLanguage::as_str`].
    /// `"text"` and `"plain"` are accepted as plaintext aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        match tag.as_str() {
            "text" | "plain" => return Ok(Self::PlainText),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == tag)
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

/// Text after the last `.` of the final path segment; empty when there is none.
///
/// Dotfiles count: `.py` has extension `py`. A trailing dot yields `""`.
pub fn file_extension(filename: &str) -> &str {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    base.rsplit_once('.').map_or("", |(_, ext)| ext)
}

/// Detects the display language from a file name.
///
/// Only the final extension counts (`archive.tar.py` is Python). A name
/// without an extension is plaintext.
///
/// ```
/// use lang_detect::{detect_language, DetectedLanguage};
///
/// assert_eq!(detect_language("main.PY"), DetectedLanguage::Python);
/// assert_eq!(detect_language(".py"), DetectedLanguage::Python);
/// assert_eq!(detect_language("notes.md"), DetectedLanguage::PlainText);
/// ```
pub fn detect_language(filename: &str) -> DetectedLanguage {
    DetectedLanguage::from_extension(file_extension(filename))
}
