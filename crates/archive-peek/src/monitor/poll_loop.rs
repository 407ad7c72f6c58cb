//! Hover monitor: the per-tick state machine that notices a newly hovered archive and dispatches
//! a cancellable read for it.
//!
//! `tick()` is synchronous and cheap apart from the resolver call. The archive read runs as a
//! detached tokio task, so the reentrancy guard only spans detection; a newer target cancels the
//! older read instead of waiting for it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::debug;
use tokio::runtime::Handle;

use crate::archive::catalog::ArchiveCatalogReader;
use crate::cancel::CancellationToken;
use crate::ignore_poison::IgnorePoison;
use crate::monitor::collaborators::{DisplaySurface, ItemResolver, ScreenPoint};
use crate::monitor::detection::find_archive_file;
use crate::monitor::presentation::build_listing_view;
use crate::settings::Settings;

/// The popup opens this far below and right of the pointer.
pub const POPUP_OFFSET: i32 = 16;

/// What a single tick decided. Mostly useful for tests and trace logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Too soon after the last accepted tick.
    Debounced,
    /// Another tick is still resolving.
    Busy,
    /// Pointer is over the interactive popup, which stays as is.
    OverPopup,
    /// Nothing archive-like under the pointer; the popup was hidden.
    NoTarget,
    /// Same archive as before and the popup is already showing it.
    Unchanged,
    /// A read for this archive was started.
    Dispatched(PathBuf),
}

#[derive(Debug, Default)]
struct PollState {
    last_archive_path: Option<PathBuf>,
    last_trigger: Option<Instant>,
    current_cancellation: Option<CancellationToken>,
}

/// Resets the processing flag even if the resolver panics.
struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct HoverMonitor {
    runtime: Handle,
    reader: Arc<ArchiveCatalogReader>,
    resolver: Arc<dyn ItemResolver>,
    display: Arc<dyn DisplaySurface>,
    settings: Arc<Settings>,
    debounce: Duration,
    processing: AtomicBool,
    state: Mutex<PollState>,
}

impl HoverMonitor {
    /// `runtime` runs the archive reads.
    pub fn new(
        runtime: Handle,
        reader: Arc<ArchiveCatalogReader>,
        resolver: Arc<dyn ItemResolver>,
        display: Arc<dyn DisplaySurface>,
        settings: &Settings,
    ) -> Self {
        Self {
            runtime,
            reader,
            resolver,
            display,
            settings: Arc::new(settings.clone()),
            debounce: settings.debounce_interval(),
            processing: AtomicBool::new(false),
            state: Mutex::new(PollState::default()),
        }
    }

    pub fn reader(&self) -> &Arc<ArchiveCatalogReader> {
        &self.reader
    }

    pub fn tick(&self) -> TickOutcome {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&self, now: Instant) -> TickOutcome {
        {
            let state = self.state.lock_ignore_poison();
            if let Some(last) = state.last_trigger
                && now.saturating_duration_since(last) < self.debounce
            {
                return TickOutcome::Debounced;
            }
        }

        if self
            .processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return TickOutcome::Busy;
        }
        let _guard = ProcessingGuard(&self.processing);
        self.state.lock_ignore_poison().last_trigger = Some(now);

        let Some(pointer) = self.resolver.pointer_position() else {
            self.hide();
            return TickOutcome::NoTarget;
        };

        if self.display.is_visible() && self.display.is_interactive() && self.display.bounds().contains(pointer) {
            return TickOutcome::OverPopup;
        }

        let archive = self
            .resolver
            .resolve(pointer)
            .filter(|item| item.in_file_browser && !item.name.is_empty() && !item.folder.as_os_str().is_empty())
            .and_then(|item| find_archive_file(&item.folder, &item.name));
        let Some(archive) = archive else {
            self.hide();
            return TickOutcome::NoTarget;
        };

        let cancel = {
            let mut state = self.state.lock_ignore_poison();
            if state.last_archive_path.as_deref() == Some(archive.as_path()) && self.display.is_visible() {
                return TickOutcome::Unchanged;
            }

            if let Some(previous) = state.current_cancellation.take() {
                previous.cancel();
            }
            let cancel = CancellationToken::new();
            state.current_cancellation = Some(cancel.clone());
            state.last_archive_path = Some(archive.clone());
            cancel
        };

        debug!("Detected archive: {}", archive.display());
        let label = archive_label(&archive);
        let anchor = pointer.offset(POPUP_OFFSET, POPUP_OFFSET);
        self.display.show_loading(&label, anchor);
        self.dispatch_read(archive.clone(), label, anchor, cancel);

        TickOutcome::Dispatched(archive)
    }

    /// Cancels any in-flight read and forgets the current target.
    pub fn stop(&self) {
        let mut state = self.state.lock_ignore_poison();
        if let Some(cancel) = state.current_cancellation.take() {
            cancel.cancel();
        }
        state.last_archive_path = None;
    }

    fn hide(&self) {
        if self.display.is_visible() {
            self.display.hide();
        }
        let mut state = self.state.lock_ignore_poison();
        state.last_archive_path = None;
        if let Some(cancel) = state.current_cancellation.take() {
            cancel.cancel();
        }
    }

    fn dispatch_read(&self, archive: PathBuf, label: String, anchor: ScreenPoint, cancel: CancellationToken) {
        let reader = Arc::clone(&self.reader);
        let display = Arc::clone(&self.display);
        let settings = Arc::clone(&self.settings);

        self.runtime.spawn(async move {
            match reader.read(&archive, &cancel).await {
                // A newer target may have superseded this one while the read was finishing
                Ok(_) if cancel.is_cancelled() => {
                    debug!("Discarding superseded listing for {}", archive.display());
                }
                Ok(entries) => {
                    let view = build_listing_view(entries, &settings);
                    display.show_entries(&label, &view, anchor);
                }
                Err(_) => debug!("Read operation cancelled for {}", archive.display()),
            }
        });
    }
}

fn archive_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
