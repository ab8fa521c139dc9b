use std::sync::Arc;

use leasedesk_core::AppResult;
use leasedesk_domain::{Permission, PermissionCatalog, PermissionCategory, Role, User, UserId};
use tracing::{debug, warn};

use crate::{CacheKey, CachedValue, DirectoryCache, DirectoryRepository};

/// Read-through access to directory queries backed by an explicit cache.
#[derive(Clone)]
pub struct DirectoryQueryService {
    repository: Arc<dyn DirectoryRepository>,
    cache: Arc<dyn DirectoryCache>,
    ttl_seconds: u32,
}

impl DirectoryQueryService {
    /// Creates a new query service. A zero ttl disables caching.
    #[must_use]
    pub fn new(
        repository: Arc<dyn DirectoryRepository>,
        cache: Arc<dyn DirectoryCache>,
        ttl_seconds: u32,
    ) -> Self {
        Self {
            repository,
            cache,
            ttl_seconds,
        }
    }

    /// Returns the seeded permission list.
    pub async fn permissions(&self) -> AppResult<Vec<Permission>> {
        if let Some(CachedValue::Permissions(permissions)) =
            self.cached(&CacheKey::Permissions).await
        {
            return Ok(permissions);
        }

        let permissions = self.repository.list_permissions().await?;
        self.store(
            CacheKey::Permissions,
            CachedValue::Permissions(permissions.clone()),
        )
        .await;
        Ok(permissions)
    }

    /// Returns the permission catalog.
    pub async fn catalog(&self) -> AppResult<PermissionCatalog> {
        PermissionCatalog::new(self.permissions().await?)
    }

    /// Returns permission categories for the role editor.
    pub async fn categories(&self) -> AppResult<Vec<PermissionCategory>> {
        Ok(PermissionCategory::from_catalog(&self.catalog().await?))
    }

    /// Returns all roles.
    pub async fn roles(&self) -> AppResult<Vec<Role>> {
        if let Some(CachedValue::Roles(roles)) = self.cached(&CacheKey::Roles).await {
            return Ok(roles);
        }

        let roles = self.repository.list_roles().await?;
        self.store(CacheKey::Roles, CachedValue::Roles(roles.clone()))
            .await;
        Ok(roles)
    }

    /// Returns all users.
    pub async fn users(&self) -> AppResult<Vec<User>> {
        if let Some(CachedValue::Users(users)) = self.cached(&CacheKey::Users).await {
            return Ok(users);
        }

        let users = self.repository.list_users().await?;
        self.store(CacheKey::Users, CachedValue::Users(users.clone()))
            .await;
        Ok(users)
    }

    /// Returns one user.
    pub async fn user(&self, user_id: &UserId) -> AppResult<User> {
        let key = CacheKey::User(user_id.clone());
        if let Some(CachedValue::User(user)) = self.cached(&key).await {
            return Ok(*user);
        }

        let user = self.repository.find_user(user_id).await?;
        self.store(key, CachedValue::User(Box::new(user.clone())))
            .await;
        Ok(user)
    }

    /// Drops one cached query.
    pub async fn invalidate(&self, key: &CacheKey) {
        if let Err(error) = self.cache.invalidate(key).await {
            warn!(key = ?key, error = %error, "failed to invalidate directory cache entry");
        }
    }

    /// Drops cached queries that embed a user's permissions.
    pub async fn invalidate_user(&self, user_id: &UserId) {
        self.invalidate(&CacheKey::Users).await;
        self.invalidate(&CacheKey::User(user_id.clone())).await;
    }

    /// Drops every cached role and user query.
    pub async fn invalidate_permission_bearing(&self) -> usize {
        match self
            .cache
            .invalidate_matching(&CacheKey::is_permission_bearing)
            .await
        {
            Ok(dropped) => {
                debug!(dropped, "invalidated permission-bearing directory cache entries");
                dropped
            }
            Err(error) => {
                warn!(error = %error, "failed to invalidate permission-bearing cache entries");
                0
            }
        }
    }

    async fn cached(&self, key: &CacheKey) -> Option<CachedValue> {
        match self.cache.get(key).await {
            Ok(value) => value,
            Err(error) => {
                warn!(key = ?key, error = %error, "directory cache read failed");
                None
            }
        }
    }

    async fn store(&self, key: CacheKey, value: CachedValue) {
        if self.ttl_seconds == 0 {
            return;
        }

        if let Err(error) = self.cache.put(key, value, self.ttl_seconds).await {
            warn!(error = %error, "directory cache write failed");
        }
    }
}

#[cfg(test)]
mod tests;
