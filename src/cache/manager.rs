use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::{
    ChatMessage, ChatThread, CommunityMembership, FeedPage, Notification, Profile,
};
use crate::utils::relative_age_from_minutes;

/// Consider cache stale after 1 hour.
/// Balances freshness with reducing unnecessary API calls for slowly-changing data.
const CACHE_STALE_MINUTES: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        relative_age_from_minutes(self.age_minutes())
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

/// Cache for one directory's worth of data. Community screens construct
/// this with the community-scoped directory from `Config::cache_dir()`;
/// the account-level membership list uses a second manager rooted at
/// `Config::cache_root()`.
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        Ok(Some(cached))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let path = self.cache_path(name);
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(&path, contents)?;
        Ok(())
    }

    // ===== Feed =====

    pub fn load_feed(&self) -> Result<Option<CachedData<FeedPage>>> {
        self.load("feed")
    }

    pub fn save_feed(&self, feed: &FeedPage) -> Result<()> {
        self.save("feed", feed)
    }

    // ===== Members =====

    pub fn load_members(&self) -> Result<Option<CachedData<Vec<Profile>>>> {
        self.load("members")
    }

    pub fn save_members(&self, members: &[Profile]) -> Result<()> {
        self.save("members", &members)
    }

    // ===== Own Profile =====

    pub fn load_profile(&self) -> Result<Option<CachedData<Profile>>> {
        self.load("profile")
    }

    pub fn save_profile(&self, profile: &Profile) -> Result<()> {
        self.save("profile", profile)
    }

    // ===== Notifications =====

    pub fn load_notifications(&self) -> Result<Option<CachedData<Vec<Notification>>>> {
        self.load("notifications")
    }

    pub fn save_notifications(&self, notifications: &[Notification]) -> Result<()> {
        self.save("notifications", &notifications)
    }

    // ===== Chat Threads =====

    pub fn load_threads(&self) -> Result<Option<CachedData<Vec<ChatThread>>>> {
        self.load("threads")
    }

    pub fn save_threads(&self, threads: &[ChatThread]) -> Result<()> {
        self.save("threads", &threads)
    }

    // ===== Per-Thread Messages =====

    pub fn load_messages(&self, thread_id: &str) -> Result<Option<CachedData<Vec<ChatMessage>>>> {
        self.load(&format!("messages_{}", thread_id))
    }

    pub fn save_messages(&self, thread_id: &str, messages: &[ChatMessage]) -> Result<()> {
        self.save(&format!("messages_{}", thread_id), &messages)
    }

    // ===== Memberships (account-level) =====

    pub fn load_memberships(&self) -> Result<Option<CachedData<Vec<CommunityMembership>>>> {
        self.load("memberships")
    }

    pub fn save_memberships(&self, memberships: &[CommunityMembership]) -> Result<()> {
        self.save("memberships", &memberships)
    }

    // ===== Cache Age Information =====

    /// Helper to load cache and log errors without failing
    fn load_age<T>(
        &self,
        name: &str,
        loader: impl FnOnce() -> Result<Option<CachedData<T>>>,
    ) -> Option<String> {
        match loader() {
            Ok(Some(cached)) => Some(cached.age_display()),
            Ok(None) => None,
            Err(e) => {
                debug!(cache = name, error = %e, "Failed to load cache for age display");
                None
            }
        }
    }

    pub fn get_cache_ages(&self) -> CacheAges {
        CacheAges {
            feed: self.load_age("feed", || self.load_feed()),
            members: self.load_age("members", || self.load_members()),
            notifications: self.load_age("notifications", || self.load_notifications()),
            threads: self.load_age("threads", || self.load_threads()),
        }
    }

    /// Helper to check staleness and log errors without failing
    fn check_stale<T>(
        &self,
        name: &str,
        loader: impl FnOnce() -> Result<Option<CachedData<T>>>,
    ) -> bool {
        match loader() {
            Ok(Some(cached)) => cached.is_stale(),
            Ok(None) => true, // No cache = stale
            Err(e) => {
                debug!(cache = name, error = %e, "Failed to load cache for staleness check");
                true // Error reading = treat as stale
            }
        }
    }

    /// Check if any of the core cached data is stale
    pub fn any_stale(&self) -> bool {
        let stale_checks = [
            self.check_stale("feed", || self.load_feed()),
            self.check_stale("members", || self.load_members()),
            self.check_stale("threads", || self.load_threads()),
        ];
        stale_checks.iter().any(|&stale| stale)
    }
}

#[derive(Debug, Default)]
pub struct CacheAges {
    pub feed: Option<String>,
    pub members: Option<String>,
    pub notifications: Option<String>,
    pub threads: Option<String>,
}

impl CacheAges {
    /// Returns the most recent update time across the core cache types
    pub fn last_updated(&self) -> String {
        let ages = [&self.feed, &self.members, &self.threads];

        for a in ages.iter().copied().flatten() {
            return a.clone();
        }

        "never".to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_cached_data_age_display_just_now() {
        let cached = CachedData::new(vec![1, 2, 3]);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cached_data_is_stale() {
        let fresh = CachedData::new(vec![1]);
        assert!(!fresh.is_stale());

        let mut old = CachedData::new(vec![1]);
        old.cached_at = Utc::now() - Duration::minutes(61);
        assert!(old.is_stale());
    }

    #[test]
    fn test_cached_data_age_minutes() {
        let cached = CachedData::new(vec![1]);
        assert!(cached.age_minutes() <= 1);
    }

    #[test]
    fn test_cache_ages_last_updated_with_values() {
        let ages = CacheAges {
            feed: Some("5m ago".to_string()),
            members: None,
            notifications: None,
            threads: None,
        };
        assert_eq!(ages.last_updated(), "5m ago");
    }

    #[test]
    fn test_cache_ages_last_updated_empty() {
        let ages = CacheAges::default();
        assert_eq!(ages.last_updated(), "never");
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("campfire-cache-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let cache = CacheManager::new(dir.clone()).expect("cache init failed");

        let threads = vec![ChatThread {
            thread_id: "t-1".to_string(),
            title: Some("route planning".to_string()),
            last_message_at: None,
            unread_count: Some(2),
        }];
        cache.save_threads(&threads).expect("save failed");

        let loaded = cache
            .load_threads()
            .expect("load failed")
            .expect("missing cache entry");
        assert_eq!(loaded.data.len(), 1);
        assert_eq!(loaded.data[0].thread_id, "t-1");
        assert!(!loaded.is_stale());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
