//! 7-Zip command-line fallback.
//!
//! Covers formats the in-process readers don't (rar, cab, iso, wim, arj, lzh...) when 7-Zip is
//! installed. The tool is located once per backend and reused.

use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::sync::mpsc;

use log::{debug, info, warn};

use super::{BackendError, ListingBackend};
use crate::archive::entry::ArchiveEntry;
use crate::archive::table_parser::parse_listing_table;
use crate::cancel::{CANCELLATION_POLL_INTERVAL, CancellationToken};

/// 7-Zip's "list" command.
pub const LIST_COMMAND: &str = "l";

/// Executable names tried in each directory, most common first.
#[cfg(windows)]
const TOOL_NAMES: &[&str] = &["7z.exe", "7zz.exe", "7za.exe"];
#[cfg(not(windows))]
const TOOL_NAMES: &[&str] = &["7z", "7zz", "7za"];

#[cfg(windows)]
const WELL_KNOWN_PATHS: &[&str] = &[r"C:\Program Files\7-Zip\7z.exe", r"C:\Program Files (x86)\7-Zip\7z.exe"];
#[cfg(not(windows))]
const WELL_KNOWN_PATHS: &[&str] = &[
    "/usr/bin/7z",
    "/usr/local/bin/7z",
    "/opt/homebrew/bin/7z",
    "/usr/bin/7zz",
    "/usr/local/bin/7zz",
    "/opt/homebrew/bin/7zz",
];

/// Environment variables that may point at a 7-Zip install directory.
#[cfg(windows)]
const INSTALL_DIR_VARS: &[(&str, &str)] = &[
    ("SEVENZIP_HOME", ""),
    ("ProgramW6432", "7-Zip"),
    ("ProgramFiles", "7-Zip"),
    ("ProgramFiles(x86)", "7-Zip"),
];
#[cfg(not(windows))]
const INSTALL_DIR_VARS: &[(&str, &str)] = &[("SEVENZIP_HOME", "")];

/// Finds the 7-Zip executable: configured path, well-known install paths, install-dir
/// environment variables, then `PATH`. First existing file wins.
pub fn locate_archive_tool(configured: Option<&str>) -> Option<PathBuf> {
    if let Some(configured) = configured.map(str::trim).filter(|p| !p.is_empty()) {
        let path = PathBuf::from(configured);
        if path.is_file() {
            return Some(path);
        }
        warn!("Configured archive tool not found: {}", configured);
    }

    if let Some(path) = WELL_KNOWN_PATHS.iter().map(|p| PathBuf::from(*p)).find(|p| p.is_file()) {
        return Some(path);
    }

    for (var, subdir) in INSTALL_DIR_VARS {
        if let Some(dir) = std::env::var_os(var)
            && let Some(found) = find_in_dir(&Path::new(&dir).join(subdir))
        {
            return Some(found);
        }
    }

    std::env::var_os("PATH").and_then(|path_var| find_in_path(&path_var))
}

/// Scans each directory of a `PATH`-style variable for a tool executable.
pub(crate) fn find_in_path(path_var: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_var).find_map(|dir| find_in_dir(&dir))
}

fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    TOOL_NAMES.iter().map(|name| dir.join(name)).find(|p| p.is_file())
}

/// Runs `<tool> l <archive>` and parses the table it prints.
#[derive(Debug, Default)]
pub struct ExternalToolBackend {
    configured_path: Option<String>,
    tool: OnceLock<Option<PathBuf>>,
}

impl ExternalToolBackend {
    /// The tool is looked up lazily on first use, then cached.
    pub fn new(configured_path: Option<String>) -> Self {
        Self {
            configured_path,
            tool: OnceLock::new(),
        }
    }

    /// Skips lookup and always uses `tool`.
    pub fn with_tool_path(tool: PathBuf) -> Self {
        let backend = Self::new(None);
        let _ = backend.tool.set(Some(tool));
        backend
    }

    pub fn tool_path(&self) -> Option<&Path> {
        self.tool
            .get_or_init(|| {
                let found = locate_archive_tool(self.configured_path.as_deref());
                match &found {
                    Some(path) => info!("Archive tool: {}", path.display()),
                    None => info!("Archive tool: not found"),
                }
                found
            })
            .as_deref()
    }

    fn run_listing(&self, tool: &Path, archive: &Path, cancel: &CancellationToken) -> Result<Vec<u8>, BackendError> {
        let mut command = Command::new(tool);
        command
            .arg(LIST_COMMAND)
            .arg(archive)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        let mut child = command.spawn()?;
        let Some(mut stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(BackendError::Io(String::from("Archive tool stdout was not captured")));
        };

        // Drain stdout on its own thread so a hung tool can't block the cancellation check
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let mut buffer = Vec::new();
            let result = stdout.read_to_end(&mut buffer).map(|_| buffer);
            let _ = tx.send(result);
        });

        let output = loop {
            if cancel.is_cancelled() {
                debug!("external tool: cancelled, killing pid {}", child.id());
                let _ = child.kill();
                let _ = child.wait();
                return Err(BackendError::Cancelled);
            }

            match rx.recv_timeout(CANCELLATION_POLL_INTERVAL) {
                Ok(result) => break result?,
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(BackendError::Io(String::from(
                        "Archive tool output reader terminated unexpectedly",
                    )));
                }
            }
        };

        let status = child.wait()?;
        debug!("external tool: exit status {:?} for {}", status.code(), archive.display());
        if !status.success() {
            return Err(BackendError::ToolFailed(status.code()));
        }
        Ok(output)
    }
}

impl ListingBackend for ExternalToolBackend {
    fn name(&self) -> &'static str {
        "external-tool"
    }

    fn list(
        &self,
        path: &Path,
        max_entries: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<ArchiveEntry>, BackendError> {
        let tool = self.tool_path().ok_or(BackendError::ToolUnavailable)?;
        cancel.check()?;

        let output = self.run_listing(tool, path, cancel)?;
        let text = String::from_utf8_lossy(&output);
        Ok(parse_listing_table(&text, max_entries))
    }
}
