//! Key/Value Store
//!
//! Preferences-style storage: many stores share one JSON object file, each
//! owning a single key in it.
//!
//! Updates are read-modify-write cycles on the whole file. They are
//! serialized within the process and land through a rename, so readers never
//! see a half-written file. Separate processes sharing a file are not
//! coordinated.

use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use super::DataStore;
use crate::error::{CacheError, Result};

/// Held for the duration of every read-modify-write cycle.
static UPDATE_LOCK: Mutex<()> = Mutex::new(());

fn lock_updates() -> MutexGuard<'static, ()> {
    // The guarded data is (), so a panic elsewhere leaves nothing inconsistent
    UPDATE_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A [`DataStore`] holding one key of a shared JSON object file.
#[derive(Debug, Clone)]
pub struct KeyValueStore<T> {
    path: PathBuf,
    key: String,
    _item: PhantomData<fn() -> T>,
}

impl<T> KeyValueStore<T> {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
            _item: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn read_map(&self) -> Result<Map<String, Value>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(CacheError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_slice(&bytes).map_err(|err| CacheError::Read {
            path: self.path.clone(),
            source: io::Error::new(io::ErrorKind::InvalidData, err),
        })
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<()> {
        let data = serde_json::to_vec_pretty(map)?;

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        fs::write(&staging, data).map_err(|source| CacheError::Write {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &self.path).map_err(|source| CacheError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl<T: Serialize + DeserializeOwned> DataStore for KeyValueStore<T> {
    type Item = T;

    fn save(&self, item: &T) -> Result<()> {
        let _guard = lock_updates();
        let mut map = self.read_map()?;
        map.insert(self.key.clone(), serde_json::to_value(item)?);
        self.write_map(&map)
    }

    fn load(&self) -> Result<Option<T>> {
        let mut map = self.read_map()?;
        match map.remove(&self.key) {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|err| CacheError::Read {
                    path: self.path.clone(),
                    source: io::Error::new(io::ErrorKind::InvalidData, err),
                }),
            None => Ok(None),
        }
    }

    /// Removes the key. Deleting a key that was never saved is not an error.
    fn delete(&self) -> Result<()> {
        let _guard = lock_updates();
        let mut map = self.read_map()?;
        if map.remove(&self.key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct UserPreferences {
        theme: String,
        notifications: bool,
        language: String,
    }

    impl Default for UserPreferences {
        fn default() -> Self {
            Self {
                theme: "light".to_string(),
                notifications: true,
                language: "en".to_string(),
            }
        }
    }

    #[test]
    fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let store = KeyValueStore::new(tmp.path().join("defaults.json"), "user_preferences");

        store.save(&UserPreferences::default()).unwrap();

        assert_eq!(store.load().unwrap(), Some(UserPreferences::default()));
    }

    #[test]
    fn test_keys_share_one_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("defaults.json");
        let prefs = KeyValueStore::new(&path, "user_preferences");
        let counter: KeyValueStore<u32> = KeyValueStore::new(&path, "launch_count");

        prefs.save(&UserPreferences::default()).unwrap();
        counter.save(&3).unwrap();

        assert_eq!(counter.load().unwrap(), Some(3));
        assert_eq!(prefs.load().unwrap(), Some(UserPreferences::default()));

        counter.delete().unwrap();
        assert_eq!(counter.load().unwrap(), None);
        assert_eq!(prefs.load().unwrap(), Some(UserPreferences::default()));
    }

    #[test]
    fn test_concurrent_stores_keep_every_key() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("defaults.json");

        let threads: Vec<_> = (0..8)
            .map(|i| {
                let store: KeyValueStore<u32> = KeyValueStore::new(&path, format!("counter_{}", i));
                std::thread::spawn(move || {
                    for n in 0..25 {
                        store.save(&n).unwrap();
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }

        for i in 0..8 {
            let store: KeyValueStore<u32> = KeyValueStore::new(&path, format!("counter_{}", i));
            assert_eq!(store.load().unwrap(), Some(24));
        }
        assert!(!tmp.path().join("defaults.json.tmp").exists());
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let store: KeyValueStore<UserPreferences> =
            KeyValueStore::new(tmp.path().join("defaults.json"), "user_preferences");

        assert_eq!(store.load().unwrap(), None);
        store.delete().unwrap();
    }

    #[test]
    fn test_wrong_shape_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("defaults.json");
        std::fs::write(&path, br#"{"launch_count": "not a number"}"#).unwrap();
        let store: KeyValueStore<u32> = KeyValueStore::new(&path, "launch_count");

        assert!(matches!(store.load(), Err(CacheError::Read { .. })));
    }
}
