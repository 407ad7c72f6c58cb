//! Listing backends, tried in order by the catalog reader until one produces entries.
//!
//! - `LibraryBackend`: in-process readers for zip, tar (plain/gz/bz2/xz) and 7z
//! - `ExternalToolBackend`: runs `7z l` and parses its table output
//! - `NativeZipBackend`: last-resort walk of local zip headers for `.zip` files

mod external_tool;
mod library;
mod native_zip;

pub use external_tool::{ExternalToolBackend, LIST_COMMAND, locate_archive_tool};
pub use library::{ArchiveKind, LibraryBackend};
pub use native_zip::NativeZipBackend;

use std::path::Path;

use crate::archive::entry::ArchiveEntry;
use crate::cancel::{CancellationToken, Cancelled};

/// Why a backend produced nothing. The catalog reader only distinguishes `Cancelled`
/// from everything else; the rest is for debug logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// This backend doesn't handle the file's format
    Unsupported(String),
    /// The archive couldn't be opened or read
    Io(String),
    /// The archive was readable but its structure wasn't
    Format(String),
    /// No external tool was found
    ToolUnavailable,
    /// The external tool ran but reported failure
    ToolFailed(Option<i32>),
    Cancelled,
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported(what) => write!(f, "Unsupported format: {}", what),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
            Self::Format(msg) => write!(f, "Malformed archive: {}", msg),
            Self::ToolUnavailable => write!(f, "Archive tool not found"),
            Self::ToolFailed(Some(code)) => write!(f, "Archive tool exited with code {}", code),
            Self::ToolFailed(None) => write!(f, "Archive tool was terminated"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<std::io::Error> for BackendError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<Cancelled> for BackendError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

/// One strategy for listing an archive's contents.
///
/// `list` is blocking and runs on tokio's blocking pool. Implementations check `cancel` between
/// entries (or while waiting on a child process) and return `BackendError::Cancelled` promptly.
/// An `Ok` with an empty list means "nothing found", and the next backend gets a turn.
pub trait ListingBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn list(
        &self,
        path: &Path,
        max_entries: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<ArchiveEntry>, BackendError>;
}

/// Lowercased file extension including the dot, like ".zip". Empty if there is none.
pub(crate) fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}
