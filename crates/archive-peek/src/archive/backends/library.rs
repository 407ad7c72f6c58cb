//! In-process archive listing via the zip, tar, 7z and unrar crates.
//!
//! Bare `.gz`, `.bz2` and `.xz` files hold one compressed stream, so they list as a single entry.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::debug;

use super::{BackendError, ListingBackend};
use crate::archive::entry::ArchiveEntry;
use crate::cancel::CancellationToken;

/// Formats the library backend can list, detected from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Tar,
    TarGz,
    TarBz2,
    TarXz,
    SevenZip,
    Rar,
    Gzip,
    Bzip2,
    Xz,
}

impl ArchiveKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();

        if name.ends_with(".zip") || name.ends_with(".jar") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") {
            Some(Self::TarBz2)
        } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
            Some(Self::TarXz)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else if name.ends_with(".7z") {
            Some(Self::SevenZip)
        } else if name.ends_with(".rar") {
            Some(Self::Rar)
        } else if name.ends_with(".gz") {
            Some(Self::Gzip)
        } else if name.ends_with(".bz2") {
            Some(Self::Bzip2)
        } else if name.ends_with(".xz") {
            Some(Self::Xz)
        } else {
            None
        }
    }
}

/// Lists entries directly from the archive, trusting the directory flags the format records.
#[derive(Debug, Default)]
pub struct LibraryBackend;

impl LibraryBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ListingBackend for LibraryBackend {
    fn name(&self) -> &'static str {
        "library"
    }

    fn list(
        &self,
        path: &Path,
        max_entries: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<ArchiveEntry>, BackendError> {
        let kind = ArchiveKind::from_path(path)
            .ok_or_else(|| BackendError::Unsupported(path.display().to_string()))?;
        debug!("library: listing {} as {:?}", path.display(), kind);

        match kind {
            ArchiveKind::Zip => list_zip(path, max_entries, cancel),
            ArchiveKind::Tar => {
                let reader = BufReader::new(File::open(path)?);
                list_tar(reader, max_entries, cancel)
            }
            ArchiveKind::TarGz => {
                let reader = flate2::read::GzDecoder::new(BufReader::new(File::open(path)?));
                list_tar(reader, max_entries, cancel)
            }
            ArchiveKind::TarBz2 => {
                let reader = bzip2::read::BzDecoder::new(BufReader::new(File::open(path)?));
                list_tar(reader, max_entries, cancel)
            }
            ArchiveKind::TarXz => {
                let reader = xz2::read::XzDecoder::new(BufReader::new(File::open(path)?));
                list_tar(reader, max_entries, cancel)
            }
            ArchiveKind::SevenZip => list_7z(path, max_entries, cancel),
            ArchiveKind::Rar => list_rar(path, max_entries, cancel),
            ArchiveKind::Gzip => {
                let reader = flate2::read::GzDecoder::new(BufReader::new(File::open(path)?));
                list_single_stream(path, reader, ".gz")
            }
            ArchiveKind::Bzip2 => {
                let reader = bzip2::read::BzDecoder::new(BufReader::new(File::open(path)?));
                list_single_stream(path, reader, ".bz2")
            }
            ArchiveKind::Xz => {
                let reader = xz2::read::XzDecoder::new(BufReader::new(File::open(path)?));
                list_single_stream(path, reader, ".xz")
            }
        }
    }
}

fn list_zip(path: &Path, max_entries: usize, cancel: &CancellationToken) -> Result<Vec<ArchiveEntry>, BackendError> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| BackendError::Format(e.to_string()))?;

    let mut entries = Vec::new();
    for i in 0..archive.len() {
        cancel.check()?;
        // Raw access reads only the header, so encrypted entries list fine
        let file = archive
            .by_index_raw(i)
            .map_err(|e| BackendError::Format(e.to_string()))?;
        entries.push(ArchiveEntry::new(file.name(), file.size(), file.is_dir()));
        if entries.len() >= max_entries {
            break;
        }
    }
    Ok(entries)
}

fn list_tar<R: Read>(
    reader: R,
    max_entries: usize,
    cancel: &CancellationToken,
) -> Result<Vec<ArchiveEntry>, BackendError> {
    let mut archive = tar::Archive::new(reader);
    let mut entries = Vec::new();

    for entry in archive.entries().map_err(|e| BackendError::Format(e.to_string()))? {
        cancel.check()?;
        // A damaged header ends the listing but keeps the entries before it
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if entries.is_empty() => return Err(BackendError::Format(e.to_string())),
            Err(e) => {
                debug!("library: tar stream broke after {} entries: {}", entries.len(), e);
                break;
            }
        };
        let name = match entry.path() {
            Ok(name) => name.to_string_lossy().into_owned(),
            Err(e) => {
                debug!("library: skipping tar entry with unreadable path: {}", e);
                continue;
            }
        };
        let header = entry.header();
        entries.push(ArchiveEntry::new(
            name,
            header.size().unwrap_or(0),
            header.entry_type().is_dir(),
        ));
        if entries.len() >= max_entries {
            break;
        }
    }
    Ok(entries)
}

fn list_7z(path: &Path, max_entries: usize, cancel: &CancellationToken) -> Result<Vec<ArchiveEntry>, BackendError> {
    let reader = sevenz_rust::SevenZReader::open(path, sevenz_rust::Password::empty())
        .map_err(|e| BackendError::Format(e.to_string()))?;

    let mut entries = Vec::new();
    for file in &reader.archive().files {
        cancel.check()?;
        entries.push(ArchiveEntry::new(file.name(), file.size(), file.is_directory()));
        if entries.len() >= max_entries {
            break;
        }
    }
    Ok(entries)
}

fn list_rar(path: &Path, max_entries: usize, cancel: &CancellationToken) -> Result<Vec<ArchiveEntry>, BackendError> {
    let archive = unrar::Archive::new(path)
        .open_for_listing()
        .map_err(|e| BackendError::Format(e.to_string()))?;

    let mut entries = Vec::new();
    for header in archive {
        cancel.check()?;
        let header = header.map_err(|e| BackendError::Format(e.to_string()))?;
        entries.push(ArchiveEntry::new(
            header.filename.to_string_lossy(),
            header.unpacked_size,
            header.is_directory(),
        ));
        if entries.len() >= max_entries {
            break;
        }
    }
    Ok(entries)
}

/// Lists a bare compressed file as one entry named after the file minus its extension.
///
/// Decodes a few bytes first so a file that only carries the extension is rejected. The
/// reported size is the file's size on disk; the unpacked size isn't known without decoding the
/// whole stream.
fn list_single_stream<R: Read>(path: &Path, mut decoder: R, extension: &str) -> Result<Vec<ArchiveEntry>, BackendError> {
    let mut probe = [0u8; 64];
    let decoded = decoder
        .read(&mut probe)
        .map_err(|e| BackendError::Format(e.to_string()))?;
    debug!("library: {} decodes as {} ({} bytes checked)", path.display(), extension, decoded);

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let inner_name = match file_name.len().checked_sub(extension.len()) {
        Some(cut) if file_name.is_char_boundary(cut) && file_name[cut..].eq_ignore_ascii_case(extension) => {
            file_name[..cut].to_string()
        }
        _ => file_name,
    };
    let size = std::fs::metadata(path)?.len();

    Ok(vec![ArchiveEntry::file(inner_name, size)])
}
