//! Files offered to the intake, before and after validation.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::errors::{IntakeError, IntakeResult};

/// Fallback when neither the caller nor the extension tells us the MIME type.
pub const OCTET_STREAM: &str = "application/octet-stream";

static NEXT_FILE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one offered file; results are keyed by it.
///
/// Ids are unique within the process, so two drops of the same name stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u64);

impl FileId {
    fn next() -> Self {
        Self(NEXT_FILE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Where the bytes of a candidate live.
#[derive(Debug, Clone)]
enum FileSource {
    Path(PathBuf),
    Memory(Vec<u8>),
}

/// A file offered by the user (drop or picker), not yet validated.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub id: FileId,
    /// Display name (file name only, no directories).
    pub name: String,
    /// MIME type as declared by the source or guessed from the extension.
    pub declared_mime: String,
    /// Size in bytes.
    pub size: u64,
    source: FileSource,
}

impl FileCandidate {
    /// In-memory candidate. `declared_mime = None` guesses from the name.
    pub fn from_bytes(name: impl Into<String>, declared_mime: Option<&str>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let declared_mime = declared_mime
            .map(str::to_string)
            .unwrap_or_else(|| guess_mime(&name));
        Self {
            id: FileId::next(),
            size: bytes.len() as u64,
            name,
            declared_mime,
            source: FileSource::Memory(bytes),
        }
    }

    /// Candidate backed by a file on disk. Only metadata is read here.
    ///
    /// # Errors
    /// - [`IntakeError::Io`] if metadata cannot be read
    /// - [`IntakeError::NotAFile`] for directories and other non-files
    /// - [`IntakeError::NoFileName`] for paths like `/` or `..`
    pub async fn from_path(path: impl AsRef<Path>) -> IntakeResult<Self> {
        let path = path.as_ref();
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|source| IntakeError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        if !meta.is_file() {
            return Err(IntakeError::NotAFile(path.to_path_buf()));
        }
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| IntakeError::NoFileName(path.to_path_buf()))?
            .to_string();

        debug!(path = %path.display(), size = meta.len(), "candidate from path");
        Ok(Self {
            id: FileId::next(),
            declared_mime: guess_mime(&name),
            name,
            size: meta.len(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    /// Lowercased extension without the dot, if any.
    pub fn extension(&self) -> Option<String> {
        let ext = lang_detect::file_extension(&self.name);
        (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
    }

    /// Loads the file bytes, consuming the candidate's source.
    pub(crate) async fn into_bytes(self) -> IntakeResult<Vec<u8>> {
        match self.source {
            FileSource::Memory(bytes) => Ok(bytes),
            FileSource::Path(path) => tokio::fs::read(&path)
                .await
                .map_err(|source| IntakeError::Io { path, source }),
        }
    }
}

/// A file that passed validation and was decoded as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub content: String,
    pub mime: String,
    pub size: u64,
}

/// MIME type guessed from a file name's extension.
pub fn guess_mime(name: &str) -> String {
    mime_guess::from_path(name)
        .first_raw()
        .unwrap_or(OCTET_STREAM)
        .to_string()
}

/// Decodes file bytes like a browser's `readAsText`: UTF-8, invalid
/// sequences replaced, leading BOM dropped.
pub fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.strip_prefix('\u{feff}').unwrap_or(&*text).to_string()
}
