//! Memory Tier Worker
//!
//! Task owning the [`MemoryStore`] and the handle used to talk to it.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, MemoryRead, MemoryStore, TierStats};
use crate::error::{CacheError, Result};

const TIER_NAME: &str = "memory";

enum Command {
    Put {
        entry: CacheEntry,
        hold: bool,
        reply: oneshot::Sender<Option<String>>,
    },
    Read {
        key: String,
        reply: oneshot::Sender<MemoryRead>,
    },
    Promote {
        entry: CacheEntry,
        generation: u64,
        reply: oneshot::Sender<bool>,
    },
    Contains {
        key: String,
        reply: oneshot::Sender<bool>,
    },
    Remove {
        key: String,
        hold: bool,
        reply: oneshot::Sender<bool>,
    },
    Clear {
        hold: bool,
        reply: oneshot::Sender<()>,
    },
    Release {
        key: Option<String>,
    },
    Stats {
        reply: oneshot::Sender<TierStats>,
    },
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Command::Put { .. } => "Put",
            Command::Read { .. } => "Read",
            Command::Promote { .. } => "Promote",
            Command::Contains { .. } => "Contains",
            Command::Remove { .. } => "Remove",
            Command::Clear { .. } => "Clear",
            Command::Release { .. } => "Release",
            Command::Stats { .. } => "Stats",
        };
        f.write_str(name)
    }
}

// == Write Hold ==
/// Keeps promotions of one key (or of every key, for a clear) from landing
/// while the disk half of that write is in flight.
///
/// Release it with [`release`](Self::release) once the disk tier answered.
/// Dropping it releases too, on a best-effort basis.
#[derive(Debug)]
#[must_use = "a hold blocks promotions until released"]
pub struct WriteHold {
    tx: mpsc::Sender<Command>,
    key: Option<String>,
    released: bool,
}

impl WriteHold {
    pub async fn release(mut self) {
        self.released = true;
        let key = self.key.take();
        if self.tx.send(Command::Release { key }).await.is_err() {
            debug!("memory tier gone before hold release");
        }
    }
}

impl Drop for WriteHold {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let key = self.key.take();
        if let Err(mpsc::error::TrySendError::Full(_)) = self.tx.try_send(Command::Release { key }) {
            warn!("memory tier queue full, write hold left in place");
        }
    }
}

// == Memory Tier Handle ==
/// Cloneable handle to the memory tier worker.
#[derive(Debug, Clone)]
pub struct MemoryTier {
    tx: mpsc::Sender<Command>,
}

impl MemoryTier {
    /// Spawns the worker owning `store`.
    ///
    /// The worker stops once every handle has been dropped. The returned
    /// JoinHandle resolves at that point.
    pub fn spawn(store: MemoryStore, buffer: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(buffer);
        let handle = tokio::spawn(run(store, rx));
        (Self { tx }, handle)
    }

    /// Stores an entry. Returns the key evicted to make room, if any.
    pub async fn put(&self, entry: CacheEntry) -> Result<Option<String>> {
        self.request(|reply| Command::Put {
            entry,
            hold: false,
            reply,
        })
        .await
    }

    /// Stores an entry and holds the key until the returned hold is released.
    pub async fn begin_put(&self, entry: CacheEntry) -> Result<(Option<String>, WriteHold)> {
        let key = entry.key.clone();
        let evicted = self
            .request(|reply| Command::Put {
                entry,
                hold: true,
                reply,
            })
            .await?;
        Ok((evicted, self.hold(Some(key))))
    }

    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(match self.read(key).await? {
            MemoryRead::Hit(value) => Some(value),
            MemoryRead::Miss { .. } => None,
        })
    }

    /// Reads a key. A miss carries the generation needed by [`promote`](Self::promote).
    pub async fn read(&self, key: &str) -> Result<MemoryRead> {
        let key = key.to_string();
        self.request(|reply| Command::Read { key, reply }).await
    }

    /// Inserts a value found on disk, unless the key changed since the miss
    /// at `generation`. Returns whether it was inserted.
    pub async fn promote(&self, entry: CacheEntry, generation: u64) -> Result<bool> {
        self.request(|reply| Command::Promote {
            entry,
            generation,
            reply,
        })
        .await
    }

    /// Checks presence without affecting LRU order or statistics.
    pub async fn contains(&self, key: &str) -> Result<bool> {
        let key = key.to_string();
        self.request(|reply| Command::Contains { key, reply }).await
    }

    pub async fn remove(&self, key: &str) -> Result<bool> {
        let key = key.to_string();
        self.request(|reply| Command::Remove {
            key,
            hold: false,
            reply,
        })
        .await
    }

    /// Removes a key and holds it until the returned hold is released.
    pub async fn begin_remove(&self, key: &str) -> Result<(bool, WriteHold)> {
        let owned = key.to_string();
        let removed = self
            .request(|reply| Command::Remove {
                key: owned,
                hold: true,
                reply,
            })
            .await?;
        Ok((removed, self.hold(Some(key.to_string()))))
    }

    pub async fn clear(&self) -> Result<()> {
        self.request(|reply| Command::Clear { hold: false, reply })
            .await
    }

    /// Clears the tier and holds every key until the returned hold is released.
    pub async fn begin_clear(&self) -> Result<WriteHold> {
        self.request(|reply| Command::Clear { hold: true, reply })
            .await?;
        Ok(self.hold(None))
    }

    pub async fn stats(&self) -> Result<TierStats> {
        self.request(|reply| Command::Stats { reply }).await
    }

    fn hold(&self, key: Option<String>) -> WriteHold {
        WriteHold {
            tx: self.tx.clone(),
            key,
            released: false,
        }
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

async fn run(mut store: MemoryStore, mut rx: mpsc::Receiver<Command>) {
    info!(
        max_entries = store.max_entries(),
        "memory tier worker started"
    );

    while let Some(command) = rx.recv().await {
        debug!(?command, "memory tier request");
        match command {
            Command::Put { entry, hold, reply } => {
                if hold {
                    store.hold(Some(&entry.key));
                }
                let _ = reply.send(store.put(entry));
            }
            Command::Read { key, reply } => {
                let _ = reply.send(store.read(&key));
            }
            Command::Promote {
                entry,
                generation,
                reply,
            } => {
                let key = entry.key.clone();
                let promoted = store.promote(entry, generation);
                if !promoted {
                    debug!(key = %key, "promotion dropped, key written since the miss");
                }
                let _ = reply.send(promoted);
            }
            Command::Contains { key, reply } => {
                let _ = reply.send(store.contains(&key));
            }
            Command::Remove { key, hold, reply } => {
                if hold {
                    store.hold(Some(&key));
                }
                let _ = reply.send(store.remove(&key));
            }
            Command::Clear { hold, reply } => {
                if hold {
                    store.hold(None);
                }
                store.clear();
                let _ = reply.send(());
            }
            Command::Release { key } => {
                store.release(key.as_deref());
            }
            Command::Stats { reply } => {
                let _ = reply.send(store.stats());
            }
        }
    }

    info!("memory tier worker stopped");
}
