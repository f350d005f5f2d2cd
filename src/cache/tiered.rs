//! Tiered Cache Module
//!
//! Coordinates the memory and disk tiers behind a single async interface:
//! write-through on put, read-through with promotion on get.

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{
    validate_key, CacheEntry, DiskStore, Lookup, MemoryRead, MemoryStore, TierSizes,
    TieredStats, WriteOutcome,
};
use crate::config::Config;
use crate::error::Result;
use crate::tier::{DiskTier, MemoryTier};

// == Tiered Cache ==
/// Memory tier in front of a disk tier.
///
/// There is no cross-tier transaction: a put can land in memory and fail on
/// disk, which is reported as [`WriteOutcome::Partial`] without rollback.
///
/// Mutations hold the key in the memory tier until their disk half is done,
/// and a read only promotes a disk value if the key was not written since its
/// memory miss. A slow read can therefore never put an outdated or deleted
/// value back into memory.
#[derive(Debug)]
pub struct TieredCache {
    memory: MemoryTier,
    disk: DiskTier,
    workers: Vec<JoinHandle<()>>,
}

impl TieredCache {
    // == Constructor ==
    /// Creates the disk directory and spawns one worker per tier.
    pub async fn open(config: &Config) -> Result<Self> {
        config.validate()?;

        let disk_store = DiskStore::open(&config.cache_dir, config.disk_max_entries).await?;
        let (memory, memory_worker) = MemoryTier::spawn(
            MemoryStore::new(config.memory_max_entries),
            config.worker_buffer,
        );
        let (disk, disk_worker) = DiskTier::spawn(disk_store, config.worker_buffer);

        info!(
            memory_max_entries = config.memory_max_entries,
            disk_max_entries = config.disk_max_entries,
            cache_dir = %config.cache_dir.display(),
            "tiered cache opened"
        );

        Ok(Self {
            memory,
            disk,
            workers: vec![memory_worker, disk_worker],
        })
    }

    /// Handle to the memory tier.
    pub fn memory(&self) -> &MemoryTier {
        &self.memory
    }

    /// Handle to the disk tier, e.g. to write while bypassing memory.
    pub fn disk(&self) -> &DiskTier {
        &self.disk
    }

    // == Put ==
    /// Writes to memory, then to disk (followed by the disk cleanup pass).
    ///
    /// # Errors
    /// `InvalidRequest` for a bad key or oversized value; `WorkerUnavailable`
    /// if the memory tier is gone. Disk failures come back as
    /// `Ok(WriteOutcome::Partial(_))`.
    pub async fn put(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Result<WriteOutcome> {
        let entry = CacheEntry::new(key, value)?;

        let (evicted, hold) = self.memory.begin_put(entry.clone()).await?;
        if let Some(evicted) = evicted {
            debug!(key = %entry.key, evicted = %evicted, "memory tier made room");
        }

        let outcome = match self.disk.put(entry).await {
            Ok(_) => WriteOutcome::Complete,
            Err(err) => WriteOutcome::Partial(err),
        };
        hold.release().await;
        Ok(outcome)
    }

    // == Get ==
    /// Returns the value from whichever tier holds it.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lookup(key).await?.into_value())
    }

    // == Lookup ==
    /// Memory first; on a miss reads disk and promotes a hit into memory.
    ///
    /// The promotion is skipped if the key was written, removed or cleared
    /// after the memory miss. Does not distinguish "never written" from
    /// "evicted".
    pub async fn lookup(&self, key: &str) -> Result<Lookup> {
        validate_key(key)?;

        let generation = match self.memory.read(key).await? {
            MemoryRead::Hit(value) => return Ok(Lookup::Memory(value)),
            MemoryRead::Miss { generation } => generation,
        };

        let value = match self.disk.get(key).await {
            Ok(Some(value)) => value,
            Ok(None) => return Ok(Lookup::Miss),
            Err(err) => {
                warn!(key = %key, error = %err, "disk tier lookup failed, treating as miss");
                return Ok(Lookup::Miss);
            }
        };

        let entry = CacheEntry {
            key: key.to_string(),
            value,
        };
        if self.memory.promote(entry.clone(), generation).await? {
            debug!(key = %key, "promoted disk hit into memory");
        }

        Ok(Lookup::Disk(entry.value))
    }

    // == Remove ==
    /// Removes a key from both tiers. Removing an absent key is not an error.
    pub async fn remove(&self, key: &str) -> Result<WriteOutcome> {
        validate_key(key)?;

        let (_, hold) = self.memory.begin_remove(key).await?;

        let outcome = match self.disk.remove(key).await {
            Ok(_) => WriteOutcome::Complete,
            Err(err) => WriteOutcome::Partial(err),
        };
        hold.release().await;
        Ok(outcome)
    }

    /// Returns true if either tier holds the key, without promoting it.
    pub async fn contains(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        if self.memory.contains(key).await? {
            return Ok(true);
        }
        self.disk.contains(key).await
    }

    // == Clear ==
    /// Empties the memory tier and recreates the disk directory.
    pub async fn clear(&self) -> Result<WriteOutcome> {
        let hold = self.memory.begin_clear().await?;

        let outcome = match self.disk.clear().await {
            Ok(()) => WriteOutcome::Complete,
            Err(err) => WriteOutcome::Partial(err),
        };
        hold.release().await;
        Ok(outcome)
    }

    // == Sizes ==
    /// Real entry counts of both tiers.
    pub async fn sizes(&self) -> Result<TierSizes> {
        Ok(TierSizes {
            memory_entries: self.memory.stats().await?.entries,
            disk_entries: self.disk.len().await?,
        })
    }

    // == Stats ==
    /// Snapshot of both tiers' counters.
    pub async fn stats(&self) -> Result<TieredStats> {
        let (memory, disk) = tokio::try_join!(self.memory.stats(), self.disk.stats())?;
        Ok(TieredStats { memory, disk })
    }

    // == Shutdown ==
    /// Closes both request channels and waits for the workers to finish.
    ///
    /// Other clones of the tier handles keep their worker alive until they
    /// are dropped too.
    pub async fn shutdown(self) {
        let Self {
            memory,
            disk,
            workers,
        } = self;
        drop(memory);
        drop(disk);

        for worker in workers {
            if let Err(err) = worker.await {
                warn!(error = %err, "tier worker ended abnormally");
            }
        }
        info!("tiered cache shut down");
    }
}
