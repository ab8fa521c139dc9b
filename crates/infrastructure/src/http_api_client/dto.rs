use leasedesk_application::RoleInput;
use leasedesk_core::{AppError, AppResult};
use leasedesk_domain::{
    ManualPermissions, Permission, PermissionCatalog, PermissionCode, PermissionId, Role, RoleId,
    User, UserId,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

const DEFAULT_CATEGORY: &str = "General";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PermissionDto {
    id: i64,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

impl PermissionDto {
    pub(super) fn into_permission(self) -> AppResult<Permission> {
        let code = PermissionCode::new(self.name)?;
        let category = self
            .category
            .filter(|category| !category.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_owned());

        Permission::new(
            PermissionId::new(self.id),
            code,
            self.description.unwrap_or_default(),
            category,
        )
    }
}

/// Permission reference as sent by the directory: either an id or a code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(super) enum PermissionRefDto {
    Id(i64),
    Code(String),
}

impl PermissionRefDto {
    fn resolve(&self, catalog: &PermissionCatalog) -> AppResult<PermissionId> {
        match self {
            Self::Id(id) => {
                let id = PermissionId::new(*id);
                catalog
                    .get(id)
                    .map(Permission::id)
                    .ok_or_else(|| AppError::NotFound(format!("unknown permission id '{id}'")))
            }
            Self::Code(code) => catalog.resolve_code(code),
        }
    }
}

fn resolve_all(
    references: Vec<PermissionRefDto>,
    catalog: &PermissionCatalog,
    owner: &str,
) -> Vec<PermissionId> {
    references
        .into_iter()
        .filter_map(|reference| match reference.resolve(catalog) {
            Ok(id) => Some(id),
            Err(error) => {
                warn!(owner, error = %error, "dropping unresolvable permission reference");
                None
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RoleDto {
    id: i64,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    permissions: Vec<PermissionRefDto>,
}

impl RoleDto {
    pub(super) fn into_role(self, catalog: &PermissionCatalog) -> AppResult<Role> {
        let owner = format!("role {}", self.id);
        let permissions = resolve_all(self.permissions, catalog, owner.as_str());
        Role::new(RoleId::new(self.id), self.name, self.description, permissions)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ManualPermissionsDto {
    added: Vec<PermissionRefDto>,
    removed: Vec<PermissionRefDto>,
}

/// User ids arrive as numbers from some deployments and strings from others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UserIdDto {
    Number(i64),
    Text(String),
}

impl UserIdDto {
    fn into_user_id(self) -> AppResult<UserId> {
        match self {
            Self::Number(value) => UserId::new(value.to_string()),
            Self::Text(value) => UserId::new(value),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UserDto {
    id: UserIdDto,
    #[serde(default)]
    username: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    roles: Vec<RoleDto>,
    #[serde(default)]
    manual_permissions: ManualPermissionsDto,
}

impl UserDto {
    pub(super) fn into_user(self, catalog: &PermissionCatalog) -> AppResult<User> {
        let id = self.id.into_user_id()?;
        let owner = format!("user {id}");
        let roles = self
            .roles
            .into_iter()
            .map(|role| role.into_role(catalog))
            .collect::<AppResult<Vec<_>>>()?;
        let manual_permissions = ManualPermissions {
            added: resolve_all(self.manual_permissions.added, catalog, owner.as_str())
                .into_iter()
                .collect(),
            removed: resolve_all(self.manual_permissions.removed, catalog, owner.as_str())
                .into_iter()
                .collect(),
        };

        Ok(User::new(
            id,
            self.username,
            self.name,
            roles,
            manual_permissions,
        ))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct OverrideBody {
    pub(super) permission_id: i64,
    pub(super) is_granted: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RoleBody {
    name: String,
    description: Option<String>,
    permissions: Vec<String>,
}

impl RoleBody {
    /// Builds the body with permission codes, matching the shape the role list returns.
    pub(super) fn from_input(input: &RoleInput, catalog: &PermissionCatalog) -> AppResult<Self> {
        let permissions = input
            .permissions
            .iter()
            .map(|id| {
                catalog
                    .get(*id)
                    .map(|permission| permission.code().as_str().to_owned())
                    .ok_or_else(|| AppError::NotFound(format!("unknown permission id '{id}'")))
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            name: input.name.as_str().to_owned(),
            description: input.description.clone(),
            permissions,
        })
    }
}
