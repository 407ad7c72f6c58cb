//! One entry inside an archive, plus the display helpers derived from it.

use serde::Serialize;

/// Prefix that marks a synthetic "something went wrong" entry.
pub const SENTINEL_MARKER: &str = "⚠";

/// A file or directory listed from inside an archive.
///
/// `name` is the archive-internal path exactly as the backend reported it, so it may use
/// either slash style and directories may carry a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveEntry {
    name: String,
    /// In bytes. Meaningless for directories.
    size: u64,
    is_directory: bool,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, size: u64, is_directory: bool) -> Self {
        Self {
            name: name.into(),
            size,
            is_directory,
        }
    }

    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self::new(name, size, false)
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self::new(name, 0, true)
    }

    /// A single-entry stand-in for a listing we couldn't produce.
    pub fn sentinel(message: &str) -> Self {
        Self::new(format!("{} {}", SENTINEL_MARKER, message), 0, false)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    pub fn is_sentinel(&self) -> bool {
        self.name.starts_with(SENTINEL_MARKER)
    }

    /// Path with backslashes turned into forward slashes.
    pub fn display_path(&self) -> String {
        self.name.replace('\\', "/")
    }

    /// Last path segment ("file.txt" for "a/b/file.txt", "b" for "a/b/").
    pub fn display_name(&self) -> String {
        let path = self.display_path();
        let trimmed = path.trim_end_matches('/');
        match trimmed.rsplit('/').next() {
            Some(last) if !last.is_empty() => last.to_string(),
            _ => self.name.clone(),
        }
    }

    /// Empty for directories, otherwise binary units with one decimal above bytes.
    pub fn display_size(&self) -> String {
        if self.is_directory {
            String::new()
        } else {
            format_size(self.size)
        }
    }

    /// Number of slashes in the normalized path; top-level entries are 0.
    pub fn depth(&self) -> usize {
        self.display_path().trim_end_matches('/').matches('/').count()
    }

    /// Two spaces per depth level, for flat indented listings.
    pub fn indent(&self) -> String {
        " ".repeat(self.depth() * 2)
    }
}

/// Formats a byte count like "512 B", "1.5 KB", "3.0 GB".
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_is_last_segment() {
        assert_eq!(ArchiveEntry::file("folder/subfolder/file.txt", 1).display_name(), "file.txt");
        assert_eq!(ArchiveEntry::file("file.txt", 1).display_name(), "file.txt");
        assert_eq!(ArchiveEntry::directory("folder\\sub\\").display_name(), "sub");
    }

    #[test]
    fn display_path_normalizes_backslashes() {
        let entry = ArchiveEntry::file("folder\\subfolder\\file.txt", 1);
        assert_eq!(entry.display_path(), "folder/subfolder/file.txt");
    }

    #[test]
    fn size_formatting() {
        assert_eq!(ArchiveEntry::file("a", 0).display_size(), "0 B");
        assert_eq!(ArchiveEntry::file("a", 500).display_size(), "500 B");
        assert_eq!(ArchiveEntry::file("a", 1024).display_size(), "1.0 KB");
        assert_eq!(ArchiveEntry::file("a", 1536).display_size(), "1.5 KB");
        assert_eq!(ArchiveEntry::file("a", 1_048_576).display_size(), "1.0 MB");
        assert_eq!(ArchiveEntry::file("a", 512 * 1024 * 1024).display_size(), "512.0 MB");
        assert_eq!(ArchiveEntry::file("a", 1024 * 1024 * 1024).display_size(), "1.0 GB");
    }

    #[test]
    fn directories_have_no_display_size() {
        assert_eq!(ArchiveEntry::new("dir/", 4096, true).display_size(), "");
    }

    #[test]
    fn depth_and_indent() {
        let top = ArchiveEntry::file("file.txt", 1);
        let nested = ArchiveEntry::file("a\\b\\file.txt", 1);
        let dir = ArchiveEntry::directory("a/b/");

        assert_eq!(top.depth(), 0);
        assert_eq!(top.indent(), "");
        assert_eq!(nested.depth(), 2);
        assert_eq!(nested.indent(), "    ");
        assert_eq!(dir.depth(), 1);
    }

    #[test]
    fn sentinel_is_recognizable() {
        let sentinel = ArchiveEntry::sentinel("File is locked by another process");
        assert!(sentinel.is_sentinel());
        assert!(!sentinel.is_directory());
        assert!(sentinel.name().contains("locked"));
        assert!(!ArchiveEntry::file("notes.txt", 3).is_sentinel());
    }
}
