//! Cache and processing counters shared between the catalog reader and whoever displays them.

use std::sync::Mutex;

use serde::Serialize;

use crate::ignore_poison::IgnorePoison;

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// Archives listed successfully by a backend (cache hits and sentinels excluded).
    pub archives_processed: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// `cache_hits + cache_misses`.
    pub total_requests: u64,
}

#[derive(Debug, Default)]
struct Counts {
    processed: u64,
    hits: u64,
    misses: u64,
}

/// Thread-safe counters. All three live under one mutex so `reset` and `snapshot` are atomic.
#[derive(Debug, Default)]
pub struct StatisticsCounter {
    counts: Mutex<Counts>,
}

impl StatisticsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_archive_processed(&self) {
        self.counts.lock_ignore_poison().processed += 1;
    }

    pub fn record_cache_hit(&self) {
        self.counts.lock_ignore_poison().hits += 1;
    }

    pub fn record_cache_miss(&self) {
        self.counts.lock_ignore_poison().misses += 1;
    }

    pub fn reset(&self) {
        let mut counts = self.counts.lock_ignore_poison();
        *counts = Counts::default();
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let counts = self.counts.lock_ignore_poison();
        StatsSnapshot {
            archives_processed: counts.processed,
            cache_hits: counts.hits,
            cache_misses: counts.misses,
            total_requests: counts.hits + counts.misses,
        }
    }

    /// Like "processed: 3 | cache: 5/3".
    pub fn summary(&self) -> String {
        let snapshot = self.snapshot();
        format!(
            "processed: {} | cache: {}/{}",
            snapshot.archives_processed, snapshot.cache_hits, snapshot.cache_misses
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn starts_at_zero() {
        let stats = StatisticsCounter::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn total_requests_is_hits_plus_misses() {
        let stats = StatisticsCounter::new();
        stats.record_cache_hit();
        stats.record_cache_hit();
        stats.record_cache_miss();
        stats.record_cache_miss();
        stats.record_cache_miss();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.cache_hits, 2);
        assert_eq!(snapshot.cache_misses, 3);
        assert_eq!(snapshot.total_requests, 5);
        assert_eq!(snapshot.archives_processed, 0);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let stats = Arc::new(StatisticsCounter::new());
        let mut handles = Vec::new();
        for _ in 0..100 {
            let s = Arc::clone(&stats);
            handles.push(std::thread::spawn(move || s.record_archive_processed()));
            let s = Arc::clone(&stats);
            handles.push(std::thread::spawn(move || s.record_cache_hit()));
            let s = Arc::clone(&stats);
            handles.push(std::thread::spawn(move || s.record_cache_miss()));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.archives_processed, 100);
        assert_eq!(snapshot.cache_hits, 100);
        assert_eq!(snapshot.cache_misses, 100);
        assert_eq!(snapshot.total_requests, 200);
    }

    #[test]
    fn reset_zeroes_everything() {
        let stats = StatisticsCounter::new();
        stats.record_archive_processed();
        stats.record_cache_hit();
        stats.record_cache_miss();

        stats.reset();

        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn summary_format() {
        let stats = StatisticsCounter::new();
        stats.record_archive_processed();
        stats.record_cache_hit();
        stats.record_cache_miss();
        stats.record_cache_miss();

        assert_eq!(stats.summary(), "processed: 1 | cache: 1/2");
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let stats = StatisticsCounter::new();
        stats.record_cache_hit();
        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["cacheHits"], 1);
        assert_eq!(json["totalRequests"], 1);
    }
}
