//! Time-boxed store of archive listings, keyed by archive path.
//!
//! Each record carries its own TTL so negative results can expire sooner than real listings.
//! Expired records are evicted on lookup, never returned.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::archive::entry::ArchiveEntry;

/// A cached listing and when it stops being valid.
#[derive(Debug, Clone)]
pub struct CacheRecord {
    entries: Vec<ArchiveEntry>,
    cached_at: Instant,
    ttl: Duration,
}

impl CacheRecord {
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn cached_at(&self) -> Instant {
        self.cached_at
    }

    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.cached_at) >= self.ttl
    }
}

/// Listing cache. Callers pass `now` so tests can drive time explicitly.
#[derive(Debug, Default)]
pub struct CatalogCache {
    records: HashMap<PathBuf, CacheRecord>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entries for `path` if its record is still fresh. A stale record is removed first.
    pub fn get(&mut self, path: &Path, now: Instant) -> Option<Vec<ArchiveEntry>> {
        if self.records.get(path).is_some_and(|record| record.is_expired(now)) {
            self.records.remove(path);
            return None;
        }
        self.records.get(path).map(|record| record.entries.clone())
    }

    /// Stores `entries` for `path`, replacing any existing record. Also drops every other expired
    /// record so the map doesn't grow with archives nobody hovers anymore.
    pub fn insert(&mut self, path: PathBuf, entries: Vec<ArchiveEntry>, now: Instant, ttl: Duration) {
        self.records.retain(|_, record| !record.is_expired(now));
        self.records.insert(
            path,
            CacheRecord {
                entries,
                cached_at: now,
                ttl,
            },
        );
    }

    pub fn remove(&mut self, path: &Path) -> Option<CacheRecord> {
        self.records.remove(path)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
