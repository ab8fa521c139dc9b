use async_trait::async_trait;
use leasedesk_core::AppResult;
use leasedesk_domain::{Permission, Role, User, UserId};

/// Typed key of one cached directory query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// `GET /permissions`.
    Permissions,
    /// `GET /roles`.
    Roles,
    /// `GET /users`.
    Users,
    /// `GET /users/{id}`.
    User(UserId),
}

impl CacheKey {
    /// Returns whether the cached value embeds role or user permission data.
    #[must_use]
    pub fn is_permission_bearing(&self) -> bool {
        matches!(self, Self::Roles | Self::Users | Self::User(_))
    }
}

/// Cached query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedValue {
    /// Permission list.
    Permissions(Vec<Permission>),
    /// Role list.
    Roles(Vec<Role>),
    /// User list.
    Users(Vec<User>),
    /// Single user.
    User(Box<User>),
}

/// Cache port for directory query results.
#[async_trait]
pub trait DirectoryCache: Send + Sync {
    /// Returns the cached value for one key, if present and fresh.
    async fn get(&self, key: &CacheKey) -> AppResult<Option<CachedValue>>;

    /// Stores a value for one key with ttl. A zero ttl stores nothing.
    async fn put(&self, key: CacheKey, value: CachedValue, ttl_seconds: u32) -> AppResult<()>;

    /// Drops one key.
    async fn invalidate(&self, key: &CacheKey) -> AppResult<()>;

    /// Drops every key matching the predicate and returns how many were dropped.
    async fn invalidate_matching(
        &self,
        predicate: &(dyn for<'k> Fn(&'k CacheKey) -> bool + Send + Sync),
    ) -> AppResult<usize>;
}
