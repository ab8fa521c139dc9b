use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use leasedesk_application::{CacheKey, CachedValue, DirectoryCache};
use leasedesk_core::AppResult;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct DirectoryCacheEntry {
    value: CachedValue,
    expires_at: Instant,
}

/// In-memory cache adapter for directory queries.
#[derive(Default)]
pub struct InMemoryDirectoryCache {
    entries: RwLock<HashMap<CacheKey, DirectoryCacheEntry>>,
}

impl InMemoryDirectoryCache {
    /// Creates an empty in-memory directory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DirectoryCache for InMemoryDirectoryCache {
    async fn get(&self, key: &CacheKey) -> AppResult<Option<CachedValue>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(key);
        }

        Ok(None)
    }

    async fn put(&self, key: CacheKey, value: CachedValue, ttl_seconds: u32) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(u64::from(ttl_seconds)))
            .unwrap_or(now);

        self.entries
            .write()
            .await
            .insert(key, DirectoryCacheEntry { value, expires_at });

        Ok(())
    }

    async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn invalidate_matching(
        &self,
        predicate: &(dyn for<'k> Fn(&'k CacheKey) -> bool + Send + Sync),
    ) -> AppResult<usize> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !predicate(key));
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use leasedesk_application::{CacheKey, CachedValue, DirectoryCache};
    use leasedesk_domain::UserId;

    use super::InMemoryDirectoryCache;

    fn user_key(value: &str) -> CacheKey {
        CacheKey::User(UserId::new(value).unwrap_or_else(|error| panic!("{error}")))
    }

    #[tokio::test]
    async fn stores_and_returns_fresh_entries() {
        let cache = InMemoryDirectoryCache::new();
        assert!(
            cache
                .put(CacheKey::Roles, CachedValue::Roles(Vec::new()), 60)
                .await
                .is_ok()
        );

        let cached = cache.get(&CacheKey::Roles).await.unwrap_or_default();
        assert_eq!(cached, Some(CachedValue::Roles(Vec::new())));
    }

    #[tokio::test]
    async fn zero_ttl_is_not_stored() {
        let cache = InMemoryDirectoryCache::new();
        assert!(
            cache
                .put(CacheKey::Users, CachedValue::Users(Vec::new()), 0)
                .await
                .is_ok()
        );

        assert_eq!(cache.get(&CacheKey::Users).await.unwrap_or_default(), None);
    }

    #[tokio::test]
    async fn invalidate_matching_keeps_permission_list() {
        let cache = InMemoryDirectoryCache::new();
        for (key, value) in [
            (CacheKey::Permissions, CachedValue::Permissions(Vec::new())),
            (CacheKey::Roles, CachedValue::Roles(Vec::new())),
            (CacheKey::Users, CachedValue::Users(Vec::new())),
        ] {
            assert!(cache.put(key, value, 60).await.is_ok());
        }
        let _ = cache
            .put(user_key("u-7"), CachedValue::Roles(Vec::new()), 60)
            .await;

        let dropped = cache
            .invalidate_matching(&CacheKey::is_permission_bearing)
            .await
            .unwrap_or_default();

        assert_eq!(dropped, 3);
        assert!(
            cache
                .get(&CacheKey::Permissions)
                .await
                .unwrap_or_default()
                .is_some()
        );
        assert_eq!(cache.get(&user_key("u-7")).await.unwrap_or_default(), None);
    }
}
