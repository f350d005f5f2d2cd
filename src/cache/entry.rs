//! Cache Entry Module
//!
//! Defines a single key/value pair and the rules a key must follow to be
//! usable as a file name in the disk tier.

use crate::cache::{MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::error::{CacheError, Result};

// == Cache Entry ==
/// A key and its opaque byte value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The cache key
    pub key: String,
    /// The stored bytes
    pub value: Vec<u8>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a validated cache entry.
    ///
    /// # Errors
    /// Returns `InvalidRequest` if the key or value breaks the limits in
    /// [`validate_key`] or exceeds [`MAX_VALUE_SIZE`].
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Result<Self> {
        let key = key.into();
        let value = value.into();
        validate_key(&key)?;
        validate_value(&value)?;
        Ok(Self { key, value })
    }

    /// Size of the stored value in bytes.
    pub fn size(&self) -> usize {
        self.value.len()
    }
}

// == Validation ==
/// Checks that a key is non-empty, within [`MAX_KEY_LENGTH`], and safe to
/// use verbatim as a file name.
///
/// Only portable rules are enforced. See [`MAX_KEY_LENGTH`] for keys that
/// still collide or fail on particular filesystems.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidRequest("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidRequest(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    if key == "." || key == ".." {
        return Err(CacheError::InvalidRequest(format!(
            "Key '{}' is reserved",
            key
        )));
    }
    if key.contains(['/', '\\', '\0']) {
        return Err(CacheError::InvalidRequest(
            "Key cannot contain path separators or NUL".to_string(),
        ));
    }
    Ok(())
}

/// Checks that a value fits within [`MAX_VALUE_SIZE`].
pub fn validate_value(value: &[u8]) -> Result<()> {
    if value.len() > MAX_VALUE_SIZE {
        return Err(CacheError::InvalidRequest(format!(
            "Value exceeds maximum size of {} bytes",
            MAX_VALUE_SIZE
        )));
    }
    Ok(())
}
