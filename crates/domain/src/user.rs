//! Directory users and effective permission resolution.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use leasedesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::permission::PermissionId;
use crate::role::Role;

/// Opaque identifier of a directory user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Creates a validated user identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("user id must not be empty".to_owned()));
        }
        if trimmed.contains('/') {
            return Err(AppError::Validation(format!(
                "user id '{trimmed}' must not contain '/'"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for UserId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl Display for UserId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Per-user overrides layered on top of role-inherited permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualPermissions {
    /// Permissions granted regardless of roles.
    pub added: BTreeSet<PermissionId>,
    /// Inherited permissions withheld from this user.
    pub removed: BTreeSet<PermissionId>,
}

/// Directory user holding any number of roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    name: String,
    roles: Vec<Role>,
    manual_permissions: ManualPermissions,
}

impl User {
    /// Creates a user record.
    #[must_use]
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        name: impl Into<String>,
        roles: Vec<Role>,
        manual_permissions: ManualPermissions,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            name: name.into(),
            roles,
            manual_permissions,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Returns the login name.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns held roles.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        self.roles.as_slice()
    }

    /// Returns manual overrides.
    #[must_use]
    pub fn manual_permissions(&self) -> &ManualPermissions {
        &self.manual_permissions
    }

    /// Returns the union of all role permission sets.
    #[must_use]
    pub fn inherited_permissions(&self) -> BTreeSet<PermissionId> {
        self.roles
            .iter()
            .flat_map(|role| role.permissions().iter().copied())
            .collect()
    }

    /// Returns whether any held role grants the permission.
    #[must_use]
    pub fn inherits(&self, permission_id: PermissionId) -> bool {
        self.roles.iter().any(|role| role.grants(permission_id))
    }

    /// Returns `(inherited - removed) ∪ added`.
    #[must_use]
    pub fn effective_permissions(&self) -> BTreeSet<PermissionId> {
        let mut effective: BTreeSet<PermissionId> = self
            .inherited_permissions()
            .difference(&self.manual_permissions.removed)
            .copied()
            .collect();
        effective.extend(self.manual_permissions.added.iter().copied());
        effective
    }

    /// Returns whether the permission is effectively granted.
    #[must_use]
    pub fn is_granted(&self, permission_id: PermissionId) -> bool {
        if self.manual_permissions.added.contains(&permission_id) {
            return true;
        }

        self.inherits(permission_id) && !self.manual_permissions.removed.contains(&permission_id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::permission::PermissionId;
    use crate::role::{Role, RoleId};

    use super::{ManualPermissions, User, UserId};

    fn id(value: i64) -> PermissionId {
        PermissionId::new(value)
    }

    fn user(roles: Vec<Role>, manual_permissions: ManualPermissions) -> User {
        let user_id = UserId::new("u-1").unwrap_or_else(|error| panic!("{error}"));
        User::new(user_id, "priya", "Priya", roles, manual_permissions)
    }

    fn role(role_id: i64, permissions: &[i64]) -> Role {
        Role::new(
            RoleId::new(role_id),
            format!("role-{role_id}"),
            None,
            permissions.iter().copied().map(PermissionId::new),
        )
        .unwrap_or_else(|error| panic!("{error}"))
    }

    #[test]
    fn effective_set_unions_roles_and_applies_overrides() {
        let user = user(
            vec![role(1, &[1, 2]), role(2, &[2, 3])],
            ManualPermissions {
                added: BTreeSet::from([id(9)]),
                removed: BTreeSet::from([id(2)]),
            },
        );

        assert_eq!(
            user.effective_permissions(),
            BTreeSet::from([id(1), id(3), id(9)])
        );
        assert!(user.is_granted(id(9)));
        assert!(!user.is_granted(id(2)));
        assert!(user.inherits(id(2)));
    }

    #[test]
    fn added_override_wins_over_removed() {
        let user = user(
            vec![role(1, &[4])],
            ManualPermissions {
                added: BTreeSet::from([id(4)]),
                removed: BTreeSet::from([id(4)]),
            },
        );

        assert!(user.is_granted(id(4)));
        assert!(user.effective_permissions().contains(&id(4)));
    }

    #[test]
    fn user_id_rejects_path_separators() {
        assert!(UserId::new("a/b").is_err());
        assert!(UserId::new("  ").is_err());
    }
}
