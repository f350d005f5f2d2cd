//! Disk Tier Worker
//!
//! Task owning the [`DiskStore`] and the handle used to talk to it.

use std::path::PathBuf;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::{CacheEntry, DiskStore, TierStats};
use crate::error::{CacheError, Result};

const TIER_NAME: &str = "disk";

enum Command {
    Put {
        entry: CacheEntry,
        reply: oneshot::Sender<Result<usize>>,
    },
    Get {
        key: String,
        reply: oneshot::Sender<Option<Vec<u8>>>,
    },
    Contains {
        key: String,
        reply: oneshot::Sender<bool>,
    },
    Remove {
        key: String,
        reply: oneshot::Sender<Result<bool>>,
    },
    Clear {
        reply: oneshot::Sender<Result<()>>,
    },
    Len {
        reply: oneshot::Sender<Result<usize>>,
    },
    Stats {
        reply: oneshot::Sender<TierStats>,
    },
}

// == Disk Tier Handle ==
/// Cloneable handle to the disk tier worker.
#[derive(Debug, Clone)]
pub struct DiskTier {
    tx: mpsc::Sender<Command>,
    dir: PathBuf,
}

impl DiskTier {
    /// Spawns the worker owning `store`.
    pub fn spawn(store: DiskStore, buffer: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(buffer);
        let dir = store.dir().to_path_buf();
        let handle = tokio::spawn(run(store, rx));
        (Self { tx, dir }, handle)
    }

    /// Directory holding the tier's files.
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Writes an entry and runs the cleanup pass. Returns the eviction count.
    pub async fn put(&self, entry: CacheEntry) -> Result<usize> {
        self.request(|reply| Command::Put { entry, reply }).await?
    }

    /// Reads a key. Missing and unreadable files are both `None`.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let key = key.to_string();
        self.request(|reply| Command::Get { key, reply }).await
    }

    /// Checks for the key's file without reading it or touching statistics.
    pub async fn contains(&self, key: &str) -> Result<bool> {
        let key = key.to_string();
        self.request(|reply| Command::Contains { key, reply }).await
    }

    pub async fn remove(&self, key: &str) -> Result<bool> {
        let key = key.to_string();
        self.request(|reply| Command::Remove { key, reply }).await?
    }

    pub async fn clear(&self) -> Result<()> {
        self.request(|reply| Command::Clear { reply }).await?
    }

    /// Counts the files currently stored.
    pub async fn len(&self) -> Result<usize> {
        self.request(|reply| Command::Len { reply }).await?
    }

    pub async fn stats(&self) -> Result<TierStats> {
        self.request(|reply| Command::Stats { reply }).await
    }

    async fn request<R>(&self, build: impl FnOnce(oneshot::Sender<R>) -> Command) -> Result<R> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| CacheError::WorkerUnavailable(TIER_NAME))?;
        response
            .await
            .map_err(|_| CacheError::WorkerUnavailable(TIER_NAME))
    }
}

async fn run(mut store: DiskStore, mut rx: mpsc::Receiver<Command>) {
    info!(
        dir = %store.dir().display(),
        max_entries = store.max_entries(),
        "disk tier worker started"
    );

    while let Some(command) = rx.recv().await {
        match command {
            Command::Put { entry, reply } => {
                let key = entry.key.clone();
                let result = store.put(entry).await;
                if let Err(err) = &result {
                    warn!(key = %key, error = %err, "disk tier write failed");
                }
                let _ = reply.send(result);
            }
            Command::Get { key, reply } => {
                let _ = reply.send(store.get(&key).await);
            }
            Command::Contains { key, reply } => {
                let _ = reply.send(store.contains(&key).await);
            }
            Command::Remove { key, reply } => {
                let _ = reply.send(store.remove(&key).await);
            }
            Command::Clear { reply } => {
                let result = store.clear().await;
                if let Err(err) = &result {
                    warn!(error = %err, "disk tier clear failed");
                }
                let _ = reply.send(result);
            }
            Command::Len { reply } => {
                let _ = reply.send(store.len().await);
            }
            Command::Stats { reply } => {
                let _ = reply.send(store.stats().await);
            }
        }
    }

    info!("disk tier worker stopped");
}
