//! Write Log Module
//!
//! Bounded record of the most recent write sequence number per key. The
//! memory tier uses it to decide whether a promotion from disk is still
//! current: a promotion carries the sequence number observed by its miss and
//! is dropped if the key (or the whole tier) was written since.

use std::collections::{HashMap, VecDeque};

/// Number of per-key write records kept before the oldest are forgotten.
pub const WRITE_LOG_CAPACITY: usize = 4096;

#[derive(Debug)]
pub struct WriteLog {
    /// Sequence number of the latest write
    seq: u64,
    /// Latest write per key, for keys still in `order`
    last_write: HashMap<String, u64>,
    /// Writes in sequence order, oldest first
    order: VecDeque<(u64, String)>,
    /// Everything at or below this sequence number is no longer tracked
    forgotten_through: u64,
    capacity: usize,
}

impl WriteLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            seq: 0,
            last_write: HashMap::new(),
            order: VecDeque::new(),
            forgotten_through: 0,
            capacity: capacity.max(1),
        }
    }

    /// Sequence number of the latest write.
    pub fn current(&self) -> u64 {
        self.seq
    }

    /// Records a write to `key` and returns its sequence number.
    pub fn record(&mut self, key: &str) -> u64 {
        self.seq += 1;
        self.last_write.insert(key.to_string(), self.seq);
        self.order.push_back((self.seq, key.to_string()));

        while self.order.len() > self.capacity {
            let Some((seq, key)) = self.order.pop_front() else {
                break;
            };
            self.forgotten_through = seq;
            if self.last_write.get(&key) == Some(&seq) {
                self.last_write.remove(&key);
            }
        }
        self.seq
    }

    /// Records a write to every key.
    pub fn record_all(&mut self) -> u64 {
        self.seq += 1;
        self.last_write.clear();
        self.order.clear();
        self.forgotten_through = self.seq;
        self.seq
    }

    /// Returns true if nothing has written `key` after sequence number `seen`.
    ///
    /// Answers false when `seen` predates what the log still remembers.
    pub fn unchanged_since(&self, key: &str, seen: u64) -> bool {
        if seen < self.forgotten_through {
            return false;
        }
        self.last_write.get(key).map_or(true, |&seq| seq <= seen)
    }
}

impl Default for WriteLog {
    fn default() -> Self {
        Self::new(WRITE_LOG_CAPACITY)
    }
}
