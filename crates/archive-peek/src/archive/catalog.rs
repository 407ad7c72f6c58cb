//! Archive catalog reader: cache in front of an ordered chain of listing backends.
//!
//! Ordinary failures never surface as errors. They come back as a one-entry sentinel listing
//! (see `ArchiveEntry::sentinel`). Only cancellation interrupts a read.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use log::{debug, error, warn};

use crate::archive::backends::{BackendError, ExternalToolBackend, LibraryBackend, ListingBackend, NativeZipBackend};
use crate::archive::cache::CatalogCache;
use crate::archive::entry::ArchiveEntry;
use crate::cancel::{CancellationToken, Cancelled};
use crate::ignore_poison::IgnorePoison;
use crate::settings::Settings;
use crate::stats::StatisticsCounter;

pub const LOCKED_MESSAGE: &str = "File is locked by another process";
pub const NO_CAPABLE_TOOL_MESSAGE: &str = "No capable tool found. Install 7-Zip.";

type BackendChain = Arc<[Arc<dyn ListingBackend>]>;

/// Lists archives through the backend chain, caching results per path.
///
/// One instance lives as long as the monitor; the cache and counters are owned here rather than
/// being process globals.
pub struct ArchiveCatalogReader {
    backends: BackendChain,
    /// The chain's external tool backend, kept for tool reporting.
    external_tool: Option<Arc<ExternalToolBackend>>,
    cache: Mutex<CatalogCache>,
    stats: Arc<StatisticsCounter>,
    max_entries: usize,
    listing_ttl: Duration,
    failed_listing_ttl: Duration,
}

impl ArchiveCatalogReader {
    /// Default chain: in-process library readers, then the 7-Zip CLI, then the native zip walker.
    pub fn new(settings: &Settings, stats: Arc<StatisticsCounter>) -> Self {
        let external_tool = Arc::new(ExternalToolBackend::new(settings.archive_tool_path.clone()));
        let backends: Vec<Arc<dyn ListingBackend>> = vec![
            Arc::new(LibraryBackend::new()),
            Arc::clone(&external_tool) as Arc<dyn ListingBackend>,
            Arc::new(NativeZipBackend::new()),
        ];
        let mut reader = Self::with_backends(settings, stats, backends);
        reader.external_tool = Some(external_tool);
        reader
    }

    /// Custom chain, tried in the given order.
    pub fn with_backends(
        settings: &Settings,
        stats: Arc<StatisticsCounter>,
        backends: Vec<Arc<dyn ListingBackend>>,
    ) -> Self {
        Self {
            backends: backends.into(),
            external_tool: None,
            cache: Mutex::new(CatalogCache::new()),
            stats,
            max_entries: settings.max_entries.max(1),
            listing_ttl: settings.cache_ttl(),
            failed_listing_ttl: settings.failed_listing_ttl(),
        }
    }

    /// Overrides how long listings and "no capable tool" results stay cached.
    pub fn with_cache_ttls(mut self, listing_ttl: Duration, failed_listing_ttl: Duration) -> Self {
        self.listing_ttl = listing_ttl;
        self.failed_listing_ttl = failed_listing_ttl;
        self
    }

    pub fn stats(&self) -> &Arc<StatisticsCounter> {
        &self.stats
    }

    /// The located 7-Zip executable, if the chain has an external tool backend and it found one.
    pub fn tool_path(&self) -> Option<PathBuf> {
        self.external_tool
            .as_ref()
            .and_then(|tool| tool.tool_path().map(Path::to_path_buf))
    }

    pub fn is_tool_available(&self) -> bool {
        self.tool_path().is_some()
    }

    /// Lists `path`.
    ///
    /// Returns `Err(Cancelled)` only if `cancel` fires before the listing is ready. Everything
    /// else, including a missing tool or a locked file, is an `Ok` sentinel listing.
    pub async fn read(&self, path: &Path, cancel: &CancellationToken) -> Result<Vec<ArchiveEntry>, Cancelled> {
        cancel.check()?;

        // Locked files skip the cache entirely, so they're retried on the next hover. The open
        // goes through the blocking pool since a network share can take a while to answer.
        if let Err(e) = tokio::fs::File::open(path).await {
            warn!("Can't open {} for reading: {}", path.display(), e);
            return Ok(vec![ArchiveEntry::sentinel(LOCKED_MESSAGE)]);
        }

        {
            let mut cache = self.cache.lock_ignore_poison();
            if let Some(entries) = cache.get(path, Instant::now()) {
                self.stats.record_cache_hit();
                debug!("Catalog cache hit for {} ({} entries)", path.display(), entries.len());
                return Ok(entries);
            }
            self.stats.record_cache_miss();
            cache.remove(path);
        }

        let backends = Arc::clone(&self.backends);
        let path_owned = path.to_path_buf();
        let max_entries = self.max_entries;
        let task_cancel = cancel.clone();
        let task = tokio::task::spawn_blocking(move || run_chain(&backends, &path_owned, max_entries, &task_cancel));

        let joined = tokio::select! {
            joined = task => joined,
            () = cancel.cancelled() => {
                debug!("Read of {} cancelled while listing", path.display());
                return Err(Cancelled);
            }
        };

        match joined {
            Err(e) => {
                // A backend panicked. Not cached so the next hover retries.
                error!("Listing task for {} failed: {}", path.display(), e);
                Ok(vec![ArchiveEntry::sentinel(&format!("Error: {}", e))])
            }
            Ok(Err(Cancelled)) => Err(Cancelled),
            Ok(Ok(Some(entries))) => {
                self.store(path, entries.clone(), self.listing_ttl);
                self.stats.record_archive_processed();
                Ok(entries)
            }
            Ok(Ok(None)) => {
                warn!("No backend could list {}", path.display());
                let sentinel = vec![ArchiveEntry::sentinel(NO_CAPABLE_TOOL_MESSAGE)];
                self.store(path, sentinel.clone(), self.failed_listing_ttl);
                Ok(sentinel)
            }
        }
    }

    fn store(&self, path: &Path, entries: Vec<ArchiveEntry>, ttl: Duration) {
        self.cache
            .lock_ignore_poison()
            .insert(path.to_path_buf(), entries, Instant::now(), ttl);
    }
}

/// Tries each backend in order. `None` means every backend came up empty.
fn run_chain(
    backends: &[Arc<dyn ListingBackend>],
    path: &Path,
    max_entries: usize,
    cancel: &CancellationToken,
) -> Result<Option<Vec<ArchiveEntry>>, Cancelled> {
    for backend in backends {
        cancel.check()?;
        match backend.list(path, max_entries, cancel) {
            Ok(mut entries) if !entries.is_empty() => {
                entries.truncate(max_entries);
                debug!(
                    "{} listed {} entries from {}",
                    backend.name(),
                    entries.len(),
                    path.display()
                );
                return Ok(Some(entries));
            }
            Ok(_) => debug!("{} found nothing in {}", backend.name(), path.display()),
            Err(BackendError::Cancelled) => return Err(Cancelled),
            Err(e) => debug!("{} skipped {}: {}", backend.name(), path.display(), e),
        }
    }
    Ok(None)
}
