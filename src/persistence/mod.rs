//! Persistence Module
//!
//! Single-item stores that encode a serde value as JSON.
//!
//! # Stores
//! - [`FileStore`]: one JSON file per item
//! - [`KeyValueStore`]: one key inside a shared JSON object file

mod file;
mod key_value;

pub use file::FileStore;
pub use key_value::KeyValueStore;

use crate::error::Result;

// == Data Store Trait ==
/// Saves, loads and deletes a single item.
pub trait DataStore {
    type Item;

    /// Replaces the stored item.
    fn save(&self, item: &Self::Item) -> Result<()>;

    /// Returns the stored item, or None if nothing has been saved.
    fn load(&self) -> Result<Option<Self::Item>>;

    /// Removes the stored item.
    fn delete(&self) -> Result<()>;
}
