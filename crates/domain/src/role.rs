use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use leasedesk_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::permission::PermissionId;

/// Stable identifier of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(i64);

impl RoleId {
    /// Creates a role identifier from its storage value.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the storage value.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Named permission bundle inherited by every holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: NonEmptyString,
    description: Option<String>,
    permissions: BTreeSet<PermissionId>,
}

impl Role {
    /// Creates a role record.
    pub fn new(
        id: RoleId,
        name: impl Into<String>,
        description: Option<String>,
        permissions: impl IntoIterator<Item = PermissionId>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            description: description.filter(|value| !value.trim().is_empty()),
            permissions: permissions.into_iter().collect(),
        })
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the granted permission set.
    #[must_use]
    pub fn permissions(&self) -> &BTreeSet<PermissionId> {
        &self.permissions
    }

    /// Returns whether the role grants a permission.
    #[must_use]
    pub fn grants(&self, permission_id: PermissionId) -> bool {
        self.permissions.contains(&permission_id)
    }
}
