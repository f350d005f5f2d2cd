//! Cache Module
//!
//! Provides a memory tier with LRU eviction in front of a count-bounded disk
//! tier, coordinated by [`TieredCache`].

mod disk;
mod entry;
mod lru;
mod memory;
mod outcome;
mod stats;
mod tiered;
mod write_log;


// Re-export public types
pub use disk::DiskStore;
pub use entry::{validate_key, validate_value, CacheEntry};
pub use lru::LruTracker;
pub use memory::{MemoryRead, MemoryStore};
pub use outcome::{Lookup, Tier, WriteOutcome};
pub use stats::{TierSizes, TierStats, TieredStats};
pub use tiered::TieredCache;

// == Public Constants ==
/// Maximum allowed key length in bytes (the usual file name limit)
///
/// Keys are used verbatim as disk tier file names, so the filesystem under
/// the cache directory decides what counts as the same key. On a
/// case-insensitive filesystem (the macOS default) `"A"` and `"a"` share one
/// file. On Windows, keys containing `< > : " | ? *` cannot be written and
/// every put of such a key comes back as a partial write.
pub const MAX_KEY_LENGTH: usize = 255;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
