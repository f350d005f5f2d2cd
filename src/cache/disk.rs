//! Disk Store Module
//!
//! One file per key inside a dedicated directory. File contents are the
//! serde_json encoding of the value bytes. After every write a cleanup pass
//! removes the oldest files (by creation time) beyond the configured maximum.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::fs;
use tracing::{debug, warn};

use crate::cache::{validate_key, CacheEntry, TierStats};
use crate::error::{CacheError, Result};

/// A file found while scanning the cache directory.
#[derive(Debug)]
struct CachedFile {
    name: String,
    path: PathBuf,
    created: SystemTime,
}

// == Disk Store ==
/// Directory-backed key/value storage with count-bounded eviction.
#[derive(Debug)]
pub struct DiskStore {
    dir: PathBuf,
    max_entries: usize,
    stats: TierStats,
}

impl DiskStore {
    // == Constructor ==
    /// Opens (creating if needed) the cache directory.
    pub async fn open(dir: impl Into<PathBuf>, max_entries: usize) -> Result<Self> {
        let dir = dir.into();
        create_dir(&dir).await?;

        let mut store = Self {
            dir,
            max_entries,
            stats: TierStats::new(),
        };
        let existing = store.len().await?;
        store.stats.set_entries(existing);
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    // == Put ==
    /// Writes the entry's file, then runs the cleanup pass.
    ///
    /// Returns the number of files evicted by the cleanup pass. The file just
    /// written is never one of them.
    pub async fn put(&mut self, entry: CacheEntry) -> Result<usize> {
        validate_key(&entry.key)?;

        let path = self.path_for(&entry.key);
        let data = serde_json::to_vec(&entry.value)?;
        fs::write(&path, data)
            .await
            .map_err(|source| CacheError::Write {
                path: path.clone(),
                source,
            })?;

        self.cleanup(&entry.key).await
    }

    // == Get ==
    /// Reads and decodes a key's file.
    ///
    /// A missing file and an undecodable file are both a miss.
    pub async fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        if validate_key(key).is_err() {
            self.stats.record_miss();
            return None;
        }

        match self.read(key).await {
            Ok(value) => {
                self.stats.record_hit();
                Some(value)
            }
            Err(CacheError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                self.stats.record_miss();
                None
            }
            Err(err) => {
                warn!(key = %key, error = %err, "disk tier entry unreadable, treating as miss");
                self.stats.record_miss();
                None
            }
        }
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key);
        let bytes = fs::read(&path).await.map_err(|source| CacheError::Read {
            path: path.clone(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|err| CacheError::Read {
            path,
            source: io::Error::new(io::ErrorKind::InvalidData, err),
        })
    }

    /// Returns true if the key has a file, without reading it.
    pub async fn contains(&self, key: &str) -> bool {
        if validate_key(key).is_err() {
            return false;
        }
        fs::metadata(self.path_for(key))
            .await
            .map(|metadata| metadata.is_file())
            .unwrap_or(false)
    }

    // == Remove ==
    /// Deletes a key's file. Returns false if there was no such file.
    pub async fn remove(&mut self, key: &str) -> Result<bool> {
        validate_key(key)?;

        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => {
                self.stats
                    .set_entries(self.stats.entries.saturating_sub(1));
                Ok(true)
            }
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CacheError::Delete { path, source }),
        }
    }

    // == Clear ==
    /// Removes the whole directory and recreates it empty.
    pub async fn clear(&mut self) -> Result<()> {
        match fs::remove_dir_all(&self.dir).await {
            Ok(()) => {}
            Err(source) if source.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(CacheError::RemoveDir {
                    path: self.dir.clone(),
                    source,
                })
            }
        }
        create_dir(&self.dir).await?;
        self.stats.set_entries(0);
        Ok(())
    }

    // == Length ==
    /// Counts the files currently in the directory.
    pub async fn len(&self) -> Result<usize> {
        Ok(self.scan().await?.len())
    }

    // == Stats ==
    /// Returns tier statistics with a freshly counted entry total.
    ///
    /// If the directory cannot be scanned the last known count is reported.
    pub async fn stats(&mut self) -> TierStats {
        match self.len().await {
            Ok(count) => self.stats.set_entries(count),
            Err(err) => warn!(error = %err, "disk tier scan failed, reporting last known size"),
        }
        self.stats.clone()
    }

    // == Cleanup ==
    /// Removes the oldest files until at most `max_entries` remain.
    ///
    /// Full directory scan sorted by creation time, ties broken by name.
    async fn cleanup(&mut self, just_written: &str) -> Result<usize> {
        let files = self.scan().await?;
        let total = files.len();
        self.stats.set_entries(total);

        if total <= self.max_entries {
            return Ok(0);
        }

        let excess = total - self.max_entries;
        let mut candidates: Vec<CachedFile> = files
            .into_iter()
            .filter(|file| file.name != just_written)
            .collect();
        candidates.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.name.cmp(&b.name)));

        let mut removed = 0;
        for file in candidates.into_iter().take(excess) {
            match fs::remove_file(&file.path).await {
                Ok(()) => {
                    debug!(key = %file.name, "disk tier evicted oldest entry");
                    removed += 1;
                }
                Err(source) if source.kind() == io::ErrorKind::NotFound => {}
                Err(source) => {
                    self.stats.record_evictions(removed);
                    self.stats.set_entries(total - removed);
                    return Err(CacheError::Delete {
                        path: file.path,
                        source,
                    });
                }
            }
        }

        self.stats.record_evictions(removed);
        self.stats.set_entries(total - removed);
        Ok(removed)
    }

    async fn scan(&self) -> Result<Vec<CachedFile>> {
        let read_err = |source: io::Error| CacheError::Read {
            path: self.dir.clone(),
            source,
        };

        let mut files = Vec::new();
        let mut dir = fs::read_dir(&self.dir).await.map_err(read_err)?;
        while let Some(item) = dir.next_entry().await.map_err(read_err)? {
            let metadata = match item.metadata().await {
                Ok(metadata) => metadata,
                // Removed between listing and stat
                Err(source) if source.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => return Err(read_err(source)),
            };
            if !metadata.is_file() {
                continue;
            }

            let created = metadata
                .created()
                .or_else(|_| metadata.modified())
                .unwrap_or(UNIX_EPOCH);
            files.push(CachedFile {
                name: item.file_name().to_string_lossy().into_owned(),
                path: item.path(),
                created,
            });
        }
        Ok(files)
    }
}

async fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .await
        .map_err(|source| CacheError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })
}
