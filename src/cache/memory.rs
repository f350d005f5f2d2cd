//! Memory Store Module
//!
//! Bounded in-memory map with LRU eviction. Owned by the memory tier worker.

use std::collections::HashMap;

use tracing::debug;

use super::write_log::WriteLog;
use crate::cache::{CacheEntry, LruTracker, TierStats};

// == Memory Read ==
/// Result of a memory tier read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryRead {
    Hit(Vec<u8>),
    /// Key not present. `generation` is the write sequence number at the time of the
    /// miss, to be handed back to [`MemoryStore::promote`].
    Miss { generation: u64 },
}

// == Memory Store ==
/// In-memory key/value storage with LRU eviction.
#[derive(Debug)]
pub struct MemoryStore {
    /// Key-value storage
    entries: HashMap<String, Vec<u8>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: TierStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Recent writes, consulted before accepting a promotion
    writes: WriteLog,
    /// Keys with a write whose disk half is still in flight
    held_keys: HashMap<String, usize>,
    /// Clears whose disk half is still in flight
    held_clears: usize,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates a new MemoryStore holding at most `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: TierStats::new(),
            max_entries,
            writes: WriteLog::default(),
            held_keys: HashMap::new(),
            held_clears: 0,
        }
    }

    // == Put ==
    /// Stores an entry, evicting the least recently used key first when the
    /// store is full and the key is new.
    ///
    /// Returns the evicted key, if any. Overwriting never evicts.
    pub fn put(&mut self, entry: CacheEntry) -> Option<String> {
        self.writes.record(&entry.key);
        self.insert(entry)
    }

    fn insert(&mut self, entry: CacheEntry) -> Option<String> {
        if self.max_entries == 0 {
            return None;
        }

        let CacheEntry { key, value } = entry;
        let mut evicted = None;

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            if let Some(oldest) = self.lru.evict_oldest() {
                self.entries.remove(&oldest);
                self.stats.record_evictions(1);
                debug!(key = %oldest, "memory tier evicted least recently used entry");
                evicted = Some(oldest);
            }
        }

        self.lru.touch(&key);
        self.entries.insert(key, value);
        self.stats.set_entries(self.entries.len());

        evicted
    }

    // == Get ==
    /// Retrieves a value by key, marking it as recently used on a hit.
    pub fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        match self.entries.get(key) {
            Some(value) => {
                let value = value.clone();
                self.lru.touch(key);
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Like [`get`](Self::get), but a miss carries the current write
    /// generation.
    pub fn read(&mut self, key: &str) -> MemoryRead {
        match self.get(key) {
            Some(value) => MemoryRead::Hit(value),
            None => MemoryRead::Miss {
                generation: self.writes.current(),
            },
        }
    }

    // == Promote ==
    /// Inserts a value read from disk after a miss at `generation`.
    ///
    /// Refused (returns false) if the key or the whole store was written
    /// since that miss, or while such a write is still held.
    pub fn promote(&mut self, entry: CacheEntry, generation: u64) -> bool {
        if self.held_clears > 0
            || self.held_keys.contains_key(&entry.key)
            || !self.writes.unchanged_since(&entry.key, generation)
        {
            return false;
        }
        self.insert(entry);
        true
    }

    // == Holds ==
    /// Blocks promotions of `key` (every key when `None`) until the matching
    /// [`release`](Self::release).
    pub fn hold(&mut self, key: Option<&str>) {
        match key {
            Some(key) => *self.held_keys.entry(key.to_string()).or_insert(0) += 1,
            None => self.held_clears += 1,
        }
    }

    /// Ends a hold. Counts as a write, so a promotion based on a miss taken
    /// during the hold is refused too.
    pub fn release(&mut self, key: Option<&str>) {
        match key {
            Some(key) => {
                if let Some(count) = self.held_keys.get_mut(key) {
                    *count -= 1;
                    if *count == 0 {
                        self.held_keys.remove(key);
                    }
                }
                self.writes.record(key);
            }
            None => {
                self.held_clears = self.held_clears.saturating_sub(1);
                self.writes.record_all();
            }
        }
    }

    // == Remove ==
    /// Removes an entry. Returns true if the key was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.writes.record(key);
        let removed = self.entries.remove(key).is_some();
        self.lru.remove(key);
        self.stats.set_entries(self.entries.len());
        removed
    }

    // == Clear ==
    /// Drops every entry. Counters other than the entry count are kept.
    pub fn clear(&mut self) {
        self.writes.record_all();
        self.entries.clear();
        self.lru.clear();
        self.stats.set_entries(0);
    }

    /// Returns true if the key is held, without touching LRU order or stats.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    // == Stats ==
    /// Returns current tier statistics.
    pub fn stats(&self) -> TierStats {
        let mut stats = self.stats.clone();
        stats.set_entries(self.entries.len());
        stats
    }
}
