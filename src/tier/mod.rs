//! Tier Workers Module
//!
//! Each tier's state is owned by one tokio task. Handles send requests over
//! an mpsc channel and await the answer on a oneshot reply, so requests to a
//! tier are served strictly one at a time while the two tiers run
//! independently of each other.
//!
//! # Workers
//! - Memory: owns a [`MemoryStore`](crate::cache::MemoryStore)
//! - Disk: owns a [`DiskStore`](crate::cache::DiskStore)

mod disk;
mod memory;

pub use disk::DiskTier;
pub use memory::{MemoryTier, WriteHold};
