//! Local caching module for offline data access.
//!
//! This module provides the `CacheManager` for storing and retrieving
//! Campfire data locally. Data is cached in JSON format under the active
//! community's cache directory and considered stale after 60 minutes.
//!
//! Cached data types include:
//! - Feed posts and chat threads
//! - Member profiles and the caller's own profile
//! - Notifications
//! - Community memberships (account-level, cached at the root)

pub mod manager;

pub use manager::CacheManager;
