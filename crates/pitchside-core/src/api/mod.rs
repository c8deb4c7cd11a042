//! REST client module for football-data.org feeds.
//!
//! This module provides the `FeedClient` for fetching one logical feed at a
//! time, the `FeedSource` seam the cache depends on, and the typed
//! `FeedError` taxonomy.
//!
//! Requests normally go through the authenticating forwarding layer; direct
//! access adds the provider's `X-Auth-Token` header itself.

pub mod client;
pub mod error;

pub use client::{FeedClient, FeedSource, Upstream, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use error::FeedError;
