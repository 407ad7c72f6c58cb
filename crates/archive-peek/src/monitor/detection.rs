//! Decides whether a hovered item is an archive, and which file on disk it is.

use std::path::{Path, PathBuf};

/// Extensions treated as archives, in probing order.
pub const ARCHIVE_EXTENSIONS: &[&str] = &[
    ".zip", ".rar", ".7z", ".tar", ".gz", ".tgz", ".bz2", ".tbz2", ".xz", ".txz", ".cab", ".iso", ".wim", ".lzh",
    ".lzma", ".arj",
];

/// Case-insensitive. Accepts the extension with or without its leading dot.
pub fn is_archive_extension(extension: &str) -> bool {
    let trimmed = extension.trim_start_matches('.');
    if trimmed.is_empty() {
        return false;
    }
    ARCHIVE_EXTENSIONS
        .iter()
        .any(|known| known[1..].eq_ignore_ascii_case(trimmed))
}

/// Maps a hovered item to an archive file in `folder`.
///
/// A direct match wins when the file exists and its extension is an archive one. Otherwise the
/// browser may be hiding extensions, so each archive extension is appended to the name and the
/// first existing file is returned.
pub fn find_archive_file(folder: &Path, item_name: &str) -> Option<PathBuf> {
    if item_name.is_empty() {
        return None;
    }

    let direct = folder.join(item_name);
    if direct.is_file()
        && direct
            .extension()
            .is_some_and(|ext| is_archive_extension(&ext.to_string_lossy()))
    {
        return Some(direct);
    }

    ARCHIVE_EXTENSIONS
        .iter()
        .map(|ext| folder.join(format!("{}{}", item_name, ext)))
        .find(|candidate| candidate.is_file())
}
