//! File Store
//!
//! Keeps one item as a JSON document in its own file.

use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use super::DataStore;
use crate::error::{CacheError, Result};

/// A [`DataStore`] backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct FileStore<T> {
    path: PathBuf,
    _item: PhantomData<fn() -> T>,
}

impl<T> FileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _item: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T: Serialize + DeserializeOwned> DataStore for FileStore<T> {
    type Item = T;

    fn save(&self, item: &T) -> Result<()> {
        let data = serde_json::to_vec_pretty(item)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| CacheError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, data).map_err(|source| CacheError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn load(&self) -> Result<Option<T>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| CacheError::Read {
                path: self.path.clone(),
                source: io::Error::new(io::ErrorKind::InvalidData, err),
            })
    }

    fn delete(&self) -> Result<()> {
        fs::remove_file(&self.path).map_err(|source| CacheError::Delete {
            path: self.path.clone(),
            source,
        })
    }
}
