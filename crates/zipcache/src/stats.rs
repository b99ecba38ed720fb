//! Cache statistics tracking

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for image cache activity
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    joins: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    discards: AtomicU64,
}

impl CacheStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request answered from a settled entry
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request attached to an in-flight load
    pub fn record_join(&self) {
        self.joins.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request that started a fetch
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an entry dropped by the eviction window
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a load result that arrived for an evicted entry
    pub fn record_discard(&self) {
        self.discards.fetch_add(1, Ordering::Relaxed);
    }

    /// Requests answered from settled entries
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Requests that attached to a pending load
    pub fn joins(&self) -> u64 {
        self.joins.load(Ordering::Relaxed)
    }

    /// Fetches started
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Entries evicted
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Results discarded because their entry was gone
    pub fn discards(&self) -> u64 {
        self.discards.load(Ordering::Relaxed)
    }

    /// Total requests
    pub fn requests(&self) -> u64 {
        self.hits() + self.joins() + self.misses()
    }

    /// Share of requests that did not start a fetch (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.requests();
        if total == 0 {
            0.0
        } else {
            (self.hits() + self.joins()) as f64 / total as f64
        }
    }
}
