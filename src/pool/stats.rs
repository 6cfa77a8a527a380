//! Pool statistics

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

/// Running counters maintained by the pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Counters {
    /// Acquires served from an available bucket
    pub hits: u64,
    /// Acquires that had to construct a new entity
    pub misses: u64,
    /// Entities built by the factory (preload included)
    pub constructed: u64,
    /// Entities dropped on recycle because a cap was reached
    pub dropped: u64,
}

/// Snapshot of pool state and counters.
#[derive(Debug, Clone)]
pub struct PoolStats<K> {
    /// Available (inactive) entities per type key
    pub available_by_type: FxHashMap<K, usize>,
    /// Active entities per type key
    pub active_by_type: FxHashMap<K, usize>,
    /// Number of active entities
    pub total_active: usize,
    /// Number of entities resident in available buckets
    pub total_pooled: usize,
    /// Acquires served from a bucket
    pub hits: u64,
    /// Acquires that constructed a new entity
    pub misses: u64,
    /// Entities built by the factory
    pub constructed: u64,
    /// Entities dropped because a cap was reached
    pub dropped: u64,
}

impl<K: Eq + Hash> PoolStats<K> {
    /// Fraction of acquires served from a bucket, in `[0, 1]`.
    ///
    /// Zero before the first acquire.
    #[must_use]
    pub fn hit_rate(&self) -> f32 {
        hit_rate(self.hits, self.misses)
    }

    /// Available entities for `key` (zero if the key was never seen).
    #[must_use]
    pub fn available(&self, key: &K) -> usize {
        self.available_by_type.get(key).copied().unwrap_or(0)
    }

    /// Active entities for `key`.
    #[must_use]
    pub fn active(&self, key: &K) -> usize {
        self.active_by_type.get(key).copied().unwrap_or(0)
    }
}

impl<K> PoolStats<K> {
    /// Get a formatted stats string
    pub fn format_stats(&self) -> String {
        format!(
            "Active: {} | Pooled: {} | Hit rate: {:.1}% | Built: {} | Dropped: {}",
            self.total_active,
            self.total_pooled,
            hit_rate(self.hits, self.misses) * 100.0,
            self.constructed,
            self.dropped
        )
    }
}

impl<K> fmt::Display for PoolStats<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_stats())
    }
}

pub(crate) fn hit_rate(hits: u64, misses: u64) -> f32 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f32 / total as f32
    }
}
