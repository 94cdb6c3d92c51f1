//! Accept-list: which files the intake takes at all.
//!
//! Semantics follow the drop-zone widget the assistant grew out of: a file is
//! accepted when its extension is listed **or** its declared MIME type matches
//! one of the patterns, and its size does not exceed the limit. Anything else
//! is rejected without ever reaching the callback.

use thiserror::Error;

use crate::candidate::FileCandidate;

/// 1 MiB, the limit for locally read files.
pub const READ_LOCAL_MAX_BYTES: u64 = 1024 * 1024;

/// 5 MiB, the limit for files sent to `/upload-file`.
pub const UPLOAD_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// Why a candidate was turned away.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("{name}: type {mime} is not accepted")]
    Type { name: String, mime: String },

    #[error("{name}: {size} bytes exceeds the {max} byte limit")]
    TooLarge { name: String, size: u64, max: u64 },
}

/// Allowed extensions / MIME patterns plus a size limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptList {
    extensions: Vec<String>,
    mime_patterns: Vec<String>,
    max_size_bytes: u64,
}

impl AcceptList {
    /// Builds a list; extensions may be given with or without the dot, any case.
    pub fn new<E, M>(extensions: E, mime_patterns: M, max_size_bytes: u64) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        M: IntoIterator,
        M::Item: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            mime_patterns: mime_patterns
                .into_iter()
                .map(|m| m.as_ref().trim().to_ascii_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
            max_size_bytes,
        }
    }

    /// Preset for files read locally: `.txt .log .js .py .java`, any `text/*`, 1 MiB.
    pub fn read_local() -> Self {
        Self::new(
            [".txt", ".log", ".js", ".py", ".java"],
            ["text/*"],
            READ_LOCAL_MAX_BYTES,
        )
    }

    /// Preset for files sent to the backend: `.txt .log .py .js`, `text/plain`, 5 MiB.
    pub fn upload() -> Self {
        Self::new([".txt", ".log", ".py", ".js"], ["text/plain"], UPLOAD_MAX_BYTES)
    }

    /// Same list with another size limit.
    pub fn with_max_size(mut self, max_size_bytes: u64) -> Self {
        self.max_size_bytes = max_size_bytes;
        self
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Validates one candidate. The size limit is inclusive.
    pub fn check(&self, c: &FileCandidate) -> Result<(), Rejection> {
        if !self.type_allowed(c) {
            return Err(Rejection::Type {
                name: c.name.clone(),
                mime: c.declared_mime.clone(),
            });
        }
        if c.size > self.max_size_bytes {
            return Err(Rejection::TooLarge {
                name: c.name.clone(),
                size: c.size,
                max: self.max_size_bytes,
            });
        }
        Ok(())
    }

    fn type_allowed(&self, c: &FileCandidate) -> bool {
        let by_ext = c
            .extension()
            .is_some_and(|ext| self.extensions.iter().any(|e| *e == ext));
        by_ext
            || self
                .mime_patterns
                .iter()
                .any(|p| mime_matches(p, &c.declared_mime))
    }
}

/// `text/*` style matching; parameters such as `; charset=utf-8` are ignored.
fn mime_matches(pattern: &str, mime: &str) -> bool {
    let essence = mime
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match pattern.strip_suffix("/*") {
        Some(top) => essence
            .split_once('/')
            .is_some_and(|(t, sub)| t == top && !sub.is_empty()),
        None => essence == pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(name: &str, mime: &str, size: usize) -> FileCandidate {
        FileCandidate::from_bytes(name, Some(mime), vec![b'a'; size])
    }

    #[test]
    fn listed_extensions_pass_regardless_of_mime() {
        let list = AcceptList::read_local();
        for name in ["a.txt", "b.LOG", "c.js", "d.py", "E.java", ".py"] {
            assert!(list.check(&cand(name, "application/octet-stream", 3)).is_ok(), "{name}");
        }
    }

    #[test]
    fn unlisted_extension_passes_only_through_mime_pattern() {
        let local = AcceptList::read_local();
        assert!(local.check(&cand("notes.md", "text/markdown", 1)).is_ok());
        assert!(matches!(
            local.check(&cand("photo.png", "image/png", 1)),
            Err(Rejection::Type { .. })
        ));

        let upload = AcceptList::upload();
        assert!(upload.check(&cand("notes.md", "text/markdown", 1)).is_err());
        assert!(upload.check(&cand("Main.java", "text/x-java", 1)).is_err());
        assert!(upload.check(&cand("raw", "text/plain; charset=utf-8", 1)).is_ok());
    }

    #[test]
    fn size_limit_is_inclusive_and_empty_files_pass() {
        let list = AcceptList::read_local().with_max_size(10);
        assert!(list.check(&cand("a.py", "text/x-python", 10)).is_ok());
        assert!(list.check(&cand("a.py", "text/x-python", 0)).is_ok());
        assert_eq!(
            list.check(&cand("a.py", "text/x-python", 11)),
            Err(Rejection::TooLarge {
                name: "a.py".into(),
                size: 11,
                max: 10
            })
        );
    }

    #[test]
    fn presets_match_documented_limits() {
        assert_eq!(AcceptList::read_local().max_size_bytes(), 1_048_576);
        assert_eq!(AcceptList::upload().max_size_bytes(), 5_242_880);
        assert_eq!(AcceptList::upload().extensions(), ["txt", "log", "py", "js"]);
    }

    #[test]
    fn mime_wildcard_needs_a_subtype() {
        assert!(mime_matches("text/*", "TEXT/Plain"));
        assert!(!mime_matches("text/*", "text/"));
        assert!(!mime_matches("text/*", "textual"));
        assert!(mime_matches("text/plain", "text/plain;charset=utf-8"));
    }
}
