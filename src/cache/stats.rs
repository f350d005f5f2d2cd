//! Cache Statistics Module
//!
//! Tracks per-tier performance metrics including hits, misses, and evictions.

use serde::Serialize;

// == Tier Stats ==
/// Performance metrics for a single tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TierStats {
    /// Number of successful lookups
    pub hits: u64,
    /// Number of lookups that found nothing (or an unreadable file)
    pub misses: u64,
    /// Number of entries evicted due to capacity pressure
    pub evictions: u64,
    /// Current number of entries in the tier
    pub entries: usize,
}

impl TierStats {
    // == Constructor ==
    /// Creates a new TierStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the tier hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Adds `count` evictions.
    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    pub fn set_entries(&mut self, count: usize) {
        self.entries = count;
    }
}

// == Tiered Stats ==
/// Snapshot of both tiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TieredStats {
    pub memory: TierStats,
    pub disk: TierStats,
}

// == Tier Sizes ==
/// Real entry counts of both tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierSizes {
    pub memory_entries: usize,
    pub disk_entries: usize,
}

impl From<&TieredStats> for TierSizes {
    fn from(stats: &TieredStats) -> Self {
        Self {
            memory_entries: stats.memory.entries,
            disk_entries: stats.disk.entries,
        }
    }
}
