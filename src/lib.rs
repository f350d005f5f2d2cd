//! Tiered Cache - a memory tier in front of a disk tier
//!
//! Writes go through to both tiers, reads fall through from memory to disk
//! and promote disk hits. Each tier is owned by its own worker task.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod persistence;
pub mod tier;

pub use api::AppState;
pub use cache::{Lookup, TieredCache, WriteOutcome};
pub use config::Config;
pub use error::{CacheError, Result};
