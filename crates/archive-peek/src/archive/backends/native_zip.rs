//! Last-resort zip listing that walks local file headers front to back.
//!
//! Unlike the library backend, this never needs the central directory, so it still lists
//! truncated downloads and zips with a damaged tail.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::{BackendError, ListingBackend, dotted_extension};
use crate::archive::entry::ArchiveEntry;
use crate::cancel::CancellationToken;

#[derive(Debug, Default)]
pub struct NativeZipBackend;

impl NativeZipBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ListingBackend for NativeZipBackend {
    fn name(&self) -> &'static str {
        "native-zip"
    }

    fn list(
        &self,
        path: &Path,
        max_entries: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<ArchiveEntry>, BackendError> {
        if dotted_extension(path) != ".zip" {
            return Err(BackendError::Unsupported(path.display().to_string()));
        }

        let mut reader = BufReader::new(File::open(path)?);
        let mut entries = Vec::new();

        loop {
            cancel.check()?;
            let next = match zip::read::read_zipfile_from_stream(&mut reader) {
                Ok(next) => next,
                // A damaged tail ends the walk, keep what we have
                Err(e) if !entries.is_empty() => {
                    log::debug!("native-zip: stopping at damaged entry in {}: {}", path.display(), e);
                    break;
                }
                Err(e) => return Err(BackendError::Format(e.to_string())),
            };
            let Some(file) = next else {
                break;
            };

            let name = file.name().to_string();
            let is_directory = name.ends_with('/') || name.ends_with('\\');
            entries.push(ArchiveEntry::new(name, file.size(), is_directory));
            if entries.len() >= max_entries {
                break;
            }
        }

        Ok(entries)
    }
}
