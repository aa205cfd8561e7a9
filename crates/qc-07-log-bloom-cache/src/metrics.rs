//! Metrics hooks for log range scans
//!
//! Counts how sub-ranges were served and how many candidates survived each
//! stage, so operators can see cache coverage and bloom selectivity.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use qc_07_log_bloom_cache::{LogQueryService, Metrics};
//!
//! let metrics = Arc::new(Metrics::new());
//! let service = LogQueryService::with_metrics(chain, Some(store), metrics.clone());
//!
//! service.matching_logs(0, 1_000, &query)?;
//! println!("{:?}", metrics.snapshot());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for range scans
///
/// Thread-safe counters shared by every query running on a service.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Sub-ranges served from segment files
    pub cached_ranges: AtomicU64,
    /// Sub-ranges served by fetching headers
    pub uncached_ranges: AtomicU64,
    /// Digests read from segment slots
    pub digests_read: AtomicU64,
    /// Headers fetched by number for their bloom
    pub headers_scanned: AtomicU64,
    /// Blocks whose digest matched the query
    pub candidates: AtomicU64,
    /// Candidates dropped as non-canonical
    pub candidates_discarded: AtomicU64,
    /// Logs returned to callers
    pub logs_matched: AtomicU64,
    /// Queries stopped by cancellation
    pub queries_cancelled: AtomicU64,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sub-range decision
    pub fn record_range(&self, cached: bool) {
        if cached {
            self.cached_ranges.fetch_add(1, Ordering::Relaxed);
        } else {
            self.uncached_ranges.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record one digest read from a segment slot
    pub fn record_digest_read(&self) {
        self.digests_read.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one header fetched by number
    pub fn record_header_scanned(&self) {
        self.headers_scanned.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a verified candidate
    ///
    /// # Arguments
    /// * `discarded` - Whether the block turned out to be non-canonical
    /// * `logs` - Number of logs it contributed
    pub fn record_candidate(&self, discarded: bool, logs: usize) {
        self.candidates.fetch_add(1, Ordering::Relaxed);
        if discarded {
            self.candidates_discarded.fetch_add(1, Ordering::Relaxed);
        }
        self.logs_matched.fetch_add(logs as u64, Ordering::Relaxed);
    }

    /// Record a cancelled query
    pub fn record_cancelled(&self) {
        self.queries_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cached_ranges: self.cached_ranges.load(Ordering::Relaxed),
            uncached_ranges: self.uncached_ranges.load(Ordering::Relaxed),
            digests_read: self.digests_read.load(Ordering::Relaxed),
            headers_scanned: self.headers_scanned.load(Ordering::Relaxed),
            candidates: self.candidates.load(Ordering::Relaxed),
            candidates_discarded: self.candidates_discarded.load(Ordering::Relaxed),
            logs_matched: self.logs_matched.load(Ordering::Relaxed),
            queries_cancelled: self.queries_cancelled.load(Ordering::Relaxed),
        }
    }

    /// Share of scanned blocks whose digest matched the query
    ///
    /// Includes bloom false positives.
    pub fn candidate_rate(&self) -> f64 {
        let scanned = self.digests_read.load(Ordering::Relaxed)
            + self.headers_scanned.load(Ordering::Relaxed);
        let candidates = self.candidates.load(Ordering::Relaxed);
        if scanned > 0 {
            candidates as f64 / scanned as f64
        } else {
            0.0
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.cached_ranges.store(0, Ordering::Relaxed);
        self.uncached_ranges.store(0, Ordering::Relaxed);
        self.digests_read.store(0, Ordering::Relaxed);
        self.headers_scanned.store(0, Ordering::Relaxed);
        self.candidates.store(0, Ordering::Relaxed);
        self.candidates_discarded.store(0, Ordering::Relaxed);
        self.logs_matched.store(0, Ordering::Relaxed);
        self.queries_cancelled.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub cached_ranges: u64,
    pub uncached_ranges: u64,
    pub digests_read: u64,
    pub headers_scanned: u64,
    pub candidates: u64,
    pub candidates_discarded: u64,
    pub logs_matched: u64,
    pub queries_cancelled: u64,
}

/// Trait for custom metrics recording implementations
///
/// Implement this trait to integrate with external metrics systems
/// like Prometheus, StatsD, or OpenTelemetry.
pub trait MetricsRecorder: Send + Sync {
    /// Record a sub-range decision
    fn record_range(&self, cached: bool);

    /// Record one digest read from a segment slot
    fn record_digest_read(&self);

    /// Record one header fetched by number
    fn record_header_scanned(&self);

    /// Record a verified candidate
    fn record_candidate(&self, discarded: bool, logs: usize);

    /// Record a cancelled query
    fn record_cancelled(&self);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Debug, Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_range(&self, _: bool) {}
    fn record_digest_read(&self) {}
    fn record_header_scanned(&self) {}
    fn record_candidate(&self, _: bool, _: usize) {}
    fn record_cancelled(&self) {}
}

impl MetricsRecorder for Metrics {
    fn record_range(&self, cached: bool) {
        Metrics::record_range(self, cached);
    }

    fn record_digest_read(&self) {
        Metrics::record_digest_read(self);
    }

    fn record_header_scanned(&self) {
        Metrics::record_header_scanned(self);
    }

    fn record_candidate(&self, discarded: bool, logs: usize) {
        Metrics::record_candidate(self, discarded, logs);
    }

    fn record_cancelled(&self) {
        Metrics::record_cancelled(self);
    }
}
