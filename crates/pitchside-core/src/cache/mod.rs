//! Local caching module for feed snapshots.
//!
//! This module provides:
//! - `CacheStore`: the durable key to snapshot mapping, with a file-backed
//!   (`FileStore`) and an in-memory (`MemoryStore`) implementation
//! - `FeedCache`: cache-preferring and forced resolution on top of a store
//!   and a `FeedSource`
//!
//! Entries are whole snapshots stamped with their fetch time. They are
//! replaced on every successful fetch and never merged.

pub mod manager;
pub mod store;

pub use manager::FeedCache;
pub use store::{CacheEntry, CacheStore, FileStore, MemoryStore};
