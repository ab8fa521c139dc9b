use std::collections::BTreeSet;

use async_trait::async_trait;
use leasedesk_core::{AppResult, NonEmptyString};
use leasedesk_domain::{Permission, PermissionId, Role, RoleId, User, UserId};

/// Role fields committed together on role save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInput {
    /// Role name, unique in tenant scope.
    pub name: NonEmptyString,
    /// Optional description.
    pub description: Option<String>,
    /// Complete permission set; replaces the stored set wholesale.
    pub permissions: BTreeSet<PermissionId>,
}

/// Port for the directory of users, roles and permissions.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Lists seeded permissions.
    async fn list_permissions(&self) -> AppResult<Vec<Permission>>;

    /// Lists roles with their permission sets.
    async fn list_roles(&self) -> AppResult<Vec<Role>>;

    /// Lists users with roles and manual overrides.
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Finds one user, failing with `NotFound` when absent.
    async fn find_user(&self, user_id: &UserId) -> AppResult<User>;

    /// Stores an explicit grant or denial for one permission.
    async fn set_permission_override(
        &self,
        user_id: &UserId,
        permission_id: PermissionId,
        granted: bool,
    ) -> AppResult<()>;

    /// Removes the override for one permission.
    async fn clear_permission_override(
        &self,
        user_id: &UserId,
        permission_id: PermissionId,
    ) -> AppResult<()>;

    /// Creates a role.
    async fn create_role(&self, input: RoleInput) -> AppResult<Role>;

    /// Replaces a role's name, description and permission set.
    async fn update_role(&self, role_id: RoleId, input: RoleInput) -> AppResult<Role>;
}
