//! Local caching module for product lists.
//!
//! This module provides the `CacheManager` for storing and retrieving
//! product lists per category group, so the list screen has something to
//! show before the network answers. Data is cached in JSON format and
//! considered stale after 30 minutes.

pub mod manager;

pub use manager::{CacheManager, CachedData};
