//! Engine metrics
//!
//! - Counters only, monotonic for the lifetime of one engine
//! - Lock-free: every counter is an `AtomicU64` with relaxed ordering

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for one `QueryEngine`
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Queries that ran to completion
    queries_executed: AtomicU64,
    /// Filters resolved from a field index
    index_lookups: AtomicU64,
    /// Filters resolved by loading and checking records
    full_scans: AtomicU64,
    /// Planned index lookups that fell back to a full scan
    index_fallbacks: AtomicU64,
    /// Field indexes served from cache
    index_cache_hits: AtomicU64,
    /// Records fetched through the loader
    records_loaded: AtomicU64,
    /// Records served from cache
    record_cache_hits: AtomicU64,
    /// Candidates dropped by re-validation against the loaded record
    revalidation_drops: AtomicU64,
}

impl EngineMetrics {
    /// Create a registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_index_lookups(&self) {
        self.index_lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_full_scans(&self) {
        self.full_scans.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_index_fallbacks(&self) {
        self.index_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_index_cache_hits(&self) {
        self.index_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_records_loaded(&self) {
        self.records_loaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_record_cache_hits(&self) {
        self.record_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_revalidation_drops(&self, count: u64) {
        self.revalidation_drops.fetch_add(count, Ordering::Relaxed);
    }

    /// Get all counters as a point-in-time snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            index_lookups: self.index_lookups.load(Ordering::Relaxed),
            full_scans: self.full_scans.load(Ordering::Relaxed),
            index_fallbacks: self.index_fallbacks.load(Ordering::Relaxed),
            index_cache_hits: self.index_cache_hits.load(Ordering::Relaxed),
            records_loaded: self.records_loaded.load(Ordering::Relaxed),
            record_cache_hits: self.record_cache_hits.load(Ordering::Relaxed),
            revalidation_drops: self.revalidation_drops.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all engine counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub queries_executed: u64,
    pub index_lookups: u64,
    pub full_scans: u64,
    pub index_fallbacks: u64,
    pub index_cache_hits: u64,
    pub records_loaded: u64,
    pub record_cache_hits: u64,
    pub revalidation_drops: u64,
}
