//! Builders for small real archives used by backend and reader tests.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use zip::write::SimpleFileOptions;

/// Writes a stored (uncompressed) zip. A `None` payload adds a directory entry.
pub fn write_zip(dir: &Path, name: &str, entries: &[(&str, Option<&[u8]>)]) -> PathBuf {
    let path = dir.join(name);
    let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    for (entry_name, payload) in entries {
        match payload {
            Some(data) => {
                writer.start_file(*entry_name, options).unwrap();
                writer.write_all(data).unwrap();
            }
            None => writer.add_directory(*entry_name, options).unwrap(),
        }
    }
    writer.finish().unwrap();
    path
}

fn append_files<W: Write>(builder: &mut tar::Builder<W>, files: &[(&str, &[u8])]) {
    for (entry_name, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        builder.append_data(&mut header, entry_name, *data).unwrap();
    }
}

pub fn write_tar(dir: &Path, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(name);
    let mut builder = tar::Builder::new(File::create(&path).unwrap());
    append_files(&mut builder, files);
    builder.finish().unwrap();
    path
}

pub fn write_tar_gz(dir: &Path, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(name);
    let encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    append_files(&mut builder, files);
    builder.into_inner().unwrap().finish().unwrap();
    path
}
